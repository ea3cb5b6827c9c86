//! Readers and writers for the two input files.
//!
//! The price file follows the TreasuryDirect end-of-day layout: no header,
//! eight columns `CUSIP, Type, Rate, Maturity, Call, Buy, Sell, End`, with
//! maturity as `M/D/YYYY`. The liability file has a `dates,cfs` header with
//! dates as `D-Mon-YYYY`.

use crate::core::date::{format_dash_abbrev, parse_date, DateFormat, ParseError};
use crate::core::instrument::{Instrument, InstrumentType};
use crate::core::obligation::{Obligation, ObligationSchedule};
use crate::error::DedicationError;
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::str::FromStr;

/// One row of the price file, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub cusip: String,
    pub security_type: String,
    pub rate: String,
    pub maturity: String,
    #[serde(default)]
    pub call_date: String,
    pub buy: String,
    #[serde(default)]
    pub sell: String,
    #[serde(default)]
    pub end_of_day: String,
}

impl PriceRecord {
    pub fn from_instrument(instrument: &Instrument) -> Self {
        let m = instrument.maturity;
        PriceRecord {
            cusip: instrument.id.to_string(),
            security_type: instrument.kind.treasury_label().to_string(),
            rate: instrument.coupon_rate.to_string(),
            maturity: format!("{}/{}/{}", m.month(), m.day(), m.year()),
            call_date: String::new(),
            buy: instrument.clean_price.to_string(),
            sell: instrument.clean_price.to_string(),
            end_of_day: instrument.clean_price.to_string(),
        }
    }
}

/// One row of the liability file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityRecord {
    pub dates: String,
    pub cfs: String,
}

/// Why rows were dropped from the price file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreeningSummary {
    pub accepted: usize,
    pub unknown_type: usize,
    pub below_min_price: usize,
    pub matured: usize,
}

pub fn read_price_file(path: impl AsRef<Path>) -> Result<Vec<PriceRecord>, DedicationError> {
    read_price_records(std::fs::File::open(path)?)
}

pub fn read_price_records<R: io::Read>(reader: R) -> Result<Vec<PriceRecord>, DedicationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<PriceRecord>, csv::Error>>()?;
    debug!("Read {} price records", records.len());
    Ok(records)
}

/// Turn price rows into the investable universe.
///
/// Rows with an unrecognized security type, a buy price below `min_price`,
/// or a maturity on or before settlement are dropped. A malformed maturity
/// or number in a kept row aborts with [`ParseError`].
pub fn screen_universe(
    records: &[PriceRecord],
    settlement: NaiveDate,
    min_price: Decimal,
) -> Result<(Vec<Instrument>, ScreeningSummary), DedicationError> {
    let mut summary = ScreeningSummary::default();
    let mut universe = Vec::with_capacity(records.len());

    for record in records {
        let Ok(kind) = InstrumentType::from_str(&record.security_type) else {
            debug!("Dropping {}: type '{}'", record.cusip, record.security_type);
            summary.unknown_type += 1;
            continue;
        };
        let clean_price = parse_decimal("Buy", &record.buy)?;
        if clean_price < min_price {
            debug!("Dropping {}: price {} below {}", record.cusip, clean_price, min_price);
            summary.below_min_price += 1;
            continue;
        }
        let maturity = parse_date(&record.maturity, DateFormat::SlashDelimited)?;
        if maturity <= settlement {
            debug!("Dropping {}: matured {}", record.cusip, maturity);
            summary.matured += 1;
            continue;
        }
        let coupon_rate = if kind == InstrumentType::DiscountBill {
            Decimal::ZERO
        } else {
            parse_decimal("Rate", &record.rate)?
        };
        universe.push(Instrument::new(
            record.cusip.as_str(),
            kind,
            coupon_rate,
            maturity,
            clean_price,
        ));
        summary.accepted += 1;
    }

    info!(
        "Screened universe: {} accepted, {} unknown type, {} below minimum price, {} matured",
        summary.accepted, summary.unknown_type, summary.below_min_price, summary.matured
    );
    Ok((universe, summary))
}

pub fn read_liability_file(path: impl AsRef<Path>) -> Result<ObligationSchedule, DedicationError> {
    read_liabilities(std::fs::File::open(path)?)
}

pub fn read_liabilities<R: io::Read>(reader: R) -> Result<ObligationSchedule, DedicationError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut obligations = Vec::new();
    for row in reader.deserialize() {
        let record: LiabilityRecord = row?;
        let due_date = parse_date(&record.dates, DateFormat::DashAbbrevMonth)?;
        let amount = parse_decimal("cfs", &record.cfs)?;
        obligations.push(Obligation::new(due_date, amount));
    }
    let schedule = ObligationSchedule::new(obligations)?;
    info!(
        "Loaded {} obligations totalling {}",
        schedule.len(),
        schedule.total()
    );
    Ok(schedule)
}

/// Write instruments in the price file layout.
pub fn write_price_records<W: io::Write>(
    writer: W,
    instruments: &[Instrument],
) -> Result<(), DedicationError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for instrument in instruments {
        writer.serialize(PriceRecord::from_instrument(instrument))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a liability schedule in the `dates,cfs` layout.
pub fn write_liabilities<W: io::Write>(
    writer: W,
    schedule: &ObligationSchedule,
) -> Result<(), DedicationError> {
    let mut writer = csv::Writer::from_writer(writer);
    for ob in schedule.obligations() {
        writer.serialize(LiabilityRecord {
            dates: format_dash_abbrev(ob.due_date()),
            cfs: ob.amount().to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_decimal(field: &'static str, input: &str) -> Result<Decimal, ParseError> {
    let cleaned = input.trim().trim_end_matches('%');
    Decimal::from_str(cleaned).map_err(|_| ParseError::InvalidNumber {
        field,
        input: input.to_string(),
    })
}
