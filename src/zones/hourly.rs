use std::{collections::BTreeMap, io};

use chrono::NaiveDateTime;

use crate::timestamp::{format_hour, month_key};

/// Pickups of one zone during one hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneHourAggregate {
    pub zone: u32,
    pub time: NaiveDateTime,
    pub count: i64,
}

#[derive(thiserror::Error, Debug)]
#[error("count of zone {zone} at {time} overflows")]
pub struct CountOverflow {
    pub zone: u32,
    pub time: NaiveDateTime,
}

/// Sums the counts of every `(zone, hour, count)` sharing a zone and hour
///
/// The result is sorted by time, then zone.
pub fn aggregate<I>(rows: I) -> Result<Vec<ZoneHourAggregate>, CountOverflow>
where
    I: IntoIterator<Item = (u32, NaiveDateTime, i64)>,
{
    let mut sums: BTreeMap<(NaiveDateTime, u32), i64> = BTreeMap::new();
    for (zone, time, count) in rows {
        let sum = sums.entry((time, zone)).or_insert(0);
        *sum = sum
            .checked_add(count)
            .ok_or(CountOverflow { zone, time })?;
    }
    Ok(sums
        .into_iter()
        .map(|((time, zone), count)| ZoneHourAggregate { zone, time, count })
        .collect())
}

/// Splits aggregates by calendar month (`YYYY-MM`), keeping their order
pub fn partition_by_month<I>(aggregates: I) -> BTreeMap<String, Vec<ZoneHourAggregate>>
where
    I: IntoIterator<Item = ZoneHourAggregate>,
{
    let mut months: BTreeMap<String, Vec<ZoneHourAggregate>> = BTreeMap::new();
    for aggregate in aggregates {
        months
            .entry(month_key(&aggregate.time))
            .or_default()
            .push(aggregate);
    }
    months
}

/// `2023-02` -> `2023-02_1H_zone.csv`
pub fn zone_file_name(month: &str) -> String {
    format!("{}_1H_zone.csv", month)
}

/// Writes one month of aggregates with a leading row index
pub fn write_zone_csv<W: io::Write>(
    aggregates: &[ZoneHourAggregate],
    count_col: &str,
    writer: W,
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Unnamed: 0", "PUZone", count_col, "PUTime"])?;
    for (i, aggregate) in aggregates.iter().enumerate() {
        wtr.write_record([
            i.to_string(),
            aggregate.zone.to_string(),
            aggregate.count.to_string(),
            format_hour(&aggregate.time),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_hour;

    fn hour(value: &str) -> NaiveDateTime {
        parse_hour(value).unwrap()
    }

    #[test]
    fn sums_per_zone_and_hour() -> Result<(), CountOverflow> {
        let rows = vec![
            (1, hour("2023-01-01 09:00"), 2),
            (0, hour("2023-01-01 09:00"), 5),
            (1, hour("2023-01-01 08:00"), 4),
            (1, hour("2023-01-01 09:00"), 3),
        ];
        let total: i64 = rows.iter().map(|r| r.2).sum();
        let aggregates = aggregate(rows)?;
        assert_eq!(
            aggregates,
            vec![
                ZoneHourAggregate { zone: 1, time: hour("2023-01-01 08:00"), count: 4 },
                ZoneHourAggregate { zone: 0, time: hour("2023-01-01 09:00"), count: 5 },
                ZoneHourAggregate { zone: 1, time: hour("2023-01-01 09:00"), count: 5 },
            ]
        );
        assert_eq!(aggregates.iter().map(|a| a.count).sum::<i64>(), total);
        Ok(())
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        let err = aggregate(vec![
            (2, hour("2023-01-01 08:00"), i64::MAX),
            (2, hour("2023-01-01 08:00"), 1),
        ])
        .unwrap_err();
        assert_eq!(err.zone, 2);
        assert_eq!(err.time, hour("2023-01-01 08:00"));
        assert!(aggregate(vec![
            (2, hour("2023-01-01 08:00"), i64::MAX),
            (3, hour("2023-01-01 08:00"), 1),
        ])
        .is_ok());
    }

    #[test]
    fn months() -> Result<(), CountOverflow> {
        let aggregates = aggregate(vec![
            (3, hour("2023-02-01 00:00"), 1),
            (2, hour("2023-01-31 23:00"), 1),
            (0, hour("2023-02-01 00:00"), 1),
        ])?;
        let months = partition_by_month(aggregates);
        assert_eq!(months.keys().collect::<Vec<_>>(), ["2023-01", "2023-02"]);
        let february: Vec<_> = months["2023-02"].iter().map(|a| a.zone).collect();
        assert_eq!(february, vec![0, 3]);
        assert_eq!(zone_file_name("2023-02"), "2023-02_1H_zone.csv");
        Ok(())
    }

    #[test]
    fn csv_layout() -> Result<(), Box<dyn std::error::Error>> {
        let aggregates = aggregate(vec![
            (4, hour("2023-01-01 08:00"), 10),
            (1, hour("2023-01-01 09:00"), 2),
        ])?;
        let mut buf = Vec::new();
        write_zone_csv(&aggregates, "Count", &mut buf)?;
        assert_eq!(
            String::from_utf8(buf)?,
            "Unnamed: 0,PUZone,Count,PUTime\n\
             0,4,10,2023-01-01 08:00:00\n\
             1,1,2,2023-01-01 09:00:00\n"
        );
        Ok(())
    }
}
