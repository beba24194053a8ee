use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Game, Package, PackageId};

const MONTHS_PER_YEAR: u64 = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingType {
    Monthly,
    Yearly,
}

impl Display for BillingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("package {package_id} has neither a monthly nor a yearly price")]
    NoBillingOption { package_id: PackageId },
}

/// Billing options a package actually offers. A package without any price
/// cannot be turned into a `Pricing`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Pricing {
    Monthly(u64),
    Yearly(u64),
    Both { monthly: u64, yearly: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageCost {
    pub total_cost: u64,
    pub billing_type: Option<BillingType>,
    pub active_months: Option<BTreeSet<String>>,
}

impl PackageCost {
    pub fn free() -> Self {
        Self {
            total_cost: 0,
            billing_type: None,
            active_months: None,
        }
    }

    fn yearly(rate: u64) -> Self {
        Self {
            total_cost: rate.saturating_mul(MONTHS_PER_YEAR),
            billing_type: Some(BillingType::Yearly),
            active_months: None,
        }
    }

    fn monthly(rate: u64, months: BTreeSet<String>) -> Self {
        Self {
            total_cost: rate.saturating_mul(months.len() as u64),
            billing_type: Some(BillingType::Monthly),
            active_months: Some(months),
        }
    }
}

impl Pricing {
    pub fn from_package(package: &Package) -> Result<Self, PricingError> {
        match (package.monthly_price, package.yearly_price) {
            (Some(monthly), Some(yearly)) => Ok(Self::Both { monthly, yearly }),
            (Some(monthly), None) => Ok(Self::Monthly(monthly)),
            (None, Some(yearly)) => Ok(Self::Yearly(yearly)),
            (None, None) => Err(PricingError::NoBillingOption {
                package_id: package.id,
            }),
        }
    }

    /// Cheapest way to watch `games` with this package.
    ///
    /// Yearly-only packages always cost the full year. Otherwise an empty game
    /// set is free, and monthly billing wins only when strictly cheaper than
    /// the yearly total.
    pub fn cost<'a, I>(&self, games: I) -> PackageCost
    where
        I: IntoIterator<Item = &'a Game>,
    {
        let rates = match *self {
            Self::Yearly(rate) => return PackageCost::yearly(rate),
            Self::Monthly(monthly) => (monthly, None),
            Self::Both { monthly, yearly } => (monthly, Some(yearly)),
        };

        let months = active_months(games);
        if months.is_empty() {
            return PackageCost::free();
        }

        let by_month = PackageCost::monthly(rates.0, months);
        match rates.1.map(PackageCost::yearly) {
            Some(by_year) if by_year.total_cost <= by_month.total_cost => by_year,
            _ => by_month,
        }
    }
}

pub fn package_cost<'a, I>(package: &Package, games: I) -> Result<PackageCost, PricingError>
where
    I: IntoIterator<Item = &'a Game>,
{
    Ok(Pricing::from_package(package)?.cost(games))
}

pub fn active_months<'a, I>(games: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Game>,
{
    games
        .into_iter()
        .map(|game| game.starts_at.format("%Y-%m").to_string())
        .collect()
}
