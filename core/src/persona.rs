//! Persona registry: static descriptive metadata for each customer segment.
//!
//! The registry is a closed enumeration. Lookups are total: any cluster id
//! that is not registered (including a missing one) resolves to
//! [`Persona::EssentialUsers`].

use crate::types::ClusterId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    SilverSavers,
    DigitalNomads,
    TheFoundation,
    FamilyAnchors,
    PortfolioBuilders,
    EssentialUsers,
}

/// Characteristic vector on a 0–100 scale (age is in years).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaTraits {
    pub balance: u8,
    pub transactions: u8,
    pub savings: u8,
    pub investment: u8,
    pub debt: u8,
    pub age: u8,
}

/// Serializable view of a persona for presentation consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaProfile {
    pub key: Persona,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub suggested_products: [&'static str; 3],
    pub characteristics: PersonaTraits,
}

impl Persona {
    pub const ALL: [Persona; 6] = [
        Persona::SilverSavers,
        Persona::DigitalNomads,
        Persona::TheFoundation,
        Persona::FamilyAnchors,
        Persona::PortfolioBuilders,
        Persona::EssentialUsers,
    ];

    pub const DEFAULT: Persona = Persona::EssentialUsers;

    /// Resolve a possibly-missing cluster id. Never fails.
    pub fn resolve(cluster_id: Option<ClusterId>) -> Self {
        cluster_id.map_or(Self::DEFAULT, Self::for_cluster)
    }

    pub fn for_cluster(cluster_id: ClusterId) -> Self {
        match cluster_id {
            0 => Self::SilverSavers,
            1 => Self::DigitalNomads,
            2 => Self::TheFoundation,
            3 => Self::FamilyAnchors,
            4 => Self::PortfolioBuilders,
            _ => Self::DEFAULT,
        }
    }

    /// The cluster id this persona is registered under.
    pub fn cluster_id(&self) -> ClusterId {
        match self {
            Self::SilverSavers => 0,
            Self::DigitalNomads => 1,
            Self::TheFoundation => 2,
            Self::FamilyAnchors => 3,
            Self::PortfolioBuilders => 4,
            Self::EssentialUsers => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SilverSavers => "Silver Savers",
            Self::DigitalNomads => "Digital Nomads",
            Self::TheFoundation => "The Foundation",
            Self::FamilyAnchors => "Family Anchors",
            Self::PortfolioBuilders => "Portfolio Builders",
            Self::EssentialUsers => "Essential Users",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::SilverSavers => "High Balance, Low Activity",
            Self::DigitalNomads => "High Tech, Global Transactions",
            Self::TheFoundation => "Young Professionals Building Wealth",
            Self::FamilyAnchors => "Stable Income, Home-Focused",
            Self::PortfolioBuilders => "Investment-Focused, Diversified",
            Self::EssentialUsers => "Basic Banking Needs",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::SilverSavers => "#3b82f6",
            Self::DigitalNomads => "#8b5cf6",
            Self::TheFoundation => "#10b981",
            Self::FamilyAnchors => "#f59e0b",
            Self::PortfolioBuilders => "#ec4899",
            Self::EssentialUsers => "#64748b",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SilverSavers => "High savings focus, conservative spending patterns",
            Self::DigitalNomads => "Frequent digital transactions, international activity",
            Self::TheFoundation => {
                "Steady income, growing savings, building financial foundation"
            }
            Self::FamilyAnchors => "Family-oriented spending, home-related financial needs",
            Self::PortfolioBuilders => {
                "Diverse portfolio, investment-oriented, high-value customers"
            }
            Self::EssentialUsers => "Standard banking services, minimal product usage",
        }
    }

    pub fn suggested_products(&self) -> [&'static str; 3] {
        match self {
            Self::SilverSavers => ["Wealth Management", "Premium Savings", "Investment Portfolios"],
            Self::DigitalNomads => ["Premium Debit", "International Cards", "Digital Banking"],
            Self::TheFoundation => ["Personal Loans", "Savings Plans", "Credit Building"],
            Self::FamilyAnchors => ["Mortgages", "Home Insurance", "Family Plans"],
            Self::PortfolioBuilders => ["Investment Funds", "Premium Services", "Wealth Advisory"],
            Self::EssentialUsers => ["Basic Checking", "Standard Accounts", "Essential Services"],
        }
    }

    pub fn characteristics(&self) -> PersonaTraits {
        let (balance, transactions, savings, investment, debt, age) = match self {
            Self::SilverSavers => (85, 25, 90, 70, 15, 55),
            Self::DigitalNomads => (45, 95, 30, 40, 50, 32),
            Self::TheFoundation => (40, 60, 55, 35, 45, 28),
            Self::FamilyAnchors => (60, 50, 65, 50, 70, 42),
            Self::PortfolioBuilders => (90, 70, 75, 95, 30, 48),
            Self::EssentialUsers => (30, 40, 35, 20, 25, 38),
        };
        PersonaTraits { balance, transactions, savings, investment, debt, age }
    }

    pub fn profile(&self) -> PersonaProfile {
        PersonaProfile {
            key: *self,
            name: self.name(),
            subtitle: self.subtitle(),
            color: self.color(),
            description: self.description(),
            suggested_products: self.suggested_products(),
            characteristics: self.characteristics(),
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::DEFAULT
    }
}
