//! Fixed value sets the generator draws from.

use rand::Rng;

macro_rules! string_catalog {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
                Self::ALL[rng.gen_range(0..Self::ALL.len())]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str().eq_ignore_ascii_case(raw.trim()))
                    .ok_or_else(|| format!("unsupported {}: {}", stringify!($name), raw))
            }
        }
    };
}

string_catalog!(Industry {
    Technology => "Technology",
    Healthcare => "Healthcare",
    Finance => "Finance",
    Retail => "Retail",
    Manufacturing => "Manufacturing",
});

string_catalog!(CompanySize {
    Small => "Small",
    Medium => "Medium",
    Large => "Large",
    Enterprise => "Enterprise",
});

string_catalog!(
    /// Subscription tier. MRR is a lookup, never randomized.
    PlanTier {
        Basic => "Basic",
        Pro => "Pro",
        Enterprise => "Enterprise",
    }
);

string_catalog!(SubscriptionStatus {
    Active => "Active",
    Cancelled => "Cancelled",
});

string_catalog!(ChurnReason {
    PriceTooHigh => "Price too high",
    MissingFeatures => "Missing features",
    PoorSupport => "Poor support",
    SwitchingToCompetitor => "Switching to competitor",
    NoLongerNeeded => "No longer needed",
});

impl PlanTier {
    pub fn mrr(self) -> f64 {
        match self {
            PlanTier::Basic => 99.0,
            PlanTier::Pro => 299.0,
            PlanTier::Enterprise => 999.0,
        }
    }
}
