use crate::core::date::ParseError;
use crate::schedule::Frequency;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a security in the universe (a CUSIP for Treasury issues).
///
/// # Examples
///
/// ```
/// use dedicated_portfolio::core::instrument::InstrumentId;
///
/// let a = InstrumentId::new("912797GB7");
/// let b = InstrumentId::new("91282CJT9");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Kind of security. Determines how often it pays coupons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentType {
    /// Zero-coupon bill: principal only, at maturity.
    DiscountBill,
    /// Semiannual coupon note.
    CouponNote,
    /// Semiannual coupon bond.
    CouponBond,
}

impl InstrumentType {
    pub fn frequency(&self) -> Frequency {
        match self {
            InstrumentType::DiscountBill => Frequency::Zero,
            InstrumentType::CouponNote | InstrumentType::CouponBond => Frequency::SemiAnnual,
        }
    }

    /// Security type label used in the Treasury price file.
    pub fn treasury_label(&self) -> &'static str {
        match self {
            InstrumentType::DiscountBill => "MARKET BASED BILL",
            InstrumentType::CouponNote => "MARKET BASED NOTE",
            InstrumentType::CouponBond => "MARKET BASED BOND",
        }
    }
}

impl FromStr for InstrumentType {
    type Err = ParseError;

    /// Accepts the Treasury price file labels (`MARKET BASED BILL`) and the
    /// short kebab-case names (`discount-bill`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET BASED BILL" | "DISCOUNT-BILL" | "BILL" => Ok(InstrumentType::DiscountBill),
            "MARKET BASED NOTE" | "COUPON-NOTE" | "NOTE" => Ok(InstrumentType::CouponNote),
            "MARKET BASED BOND" | "COUPON-BOND" | "BOND" => Ok(InstrumentType::CouponBond),
            _ => Err(ParseError::UnknownInstrumentType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentType::DiscountBill => write!(f, "discount-bill"),
            InstrumentType::CouponNote => write!(f, "coupon-note"),
            InstrumentType::CouponBond => write!(f, "coupon-bond"),
        }
    }
}

/// A security available for purchase, as quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub kind: InstrumentType,
    /// Annual coupon rate as a fraction (0.04 for 4%). Zero for bills.
    pub coupon_rate: Decimal,
    pub maturity: NaiveDate,
    /// Quoted clean price per 100 face.
    pub clean_price: Decimal,
}

impl Instrument {
    pub fn new(
        id: impl Into<InstrumentId>,
        kind: InstrumentType,
        coupon_rate: Decimal,
        maturity: NaiveDate,
        clean_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            coupon_rate,
            maturity,
            clean_price,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.kind.frequency()
    }

    /// Annual coupon rate in percent of face.
    pub fn rate_percent(&self) -> Decimal {
        self.coupon_rate * Decimal::ONE_HUNDRED
    }
}

/// An instrument together with the price actually paid to acquire one unit
/// on the settlement date (clean price plus accrued interest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedInstrument {
    pub instrument: Instrument,
    pub accrued_interest: Decimal,
    pub transaction_price: Decimal,
}

impl PricedInstrument {
    pub fn id(&self) -> &InstrumentId {
        &self.instrument.id
    }
}
