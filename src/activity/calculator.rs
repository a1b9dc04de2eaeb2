//! Carbon emission estimate: a fixed linear factor per activity category.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Driving,
    ElectricityUsage,
    WasteDisposal,
}

impl Activity {
    pub const ALL: [Activity; 3] = [
        Activity::Driving,
        Activity::ElectricityUsage,
        Activity::WasteDisposal,
    ];

    /// Exact match on the form label; anything else is not a known category.
    pub fn parse(label: &str) -> Option<Activity> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::Driving => "Driving",
            Activity::ElectricityUsage => "ElectricityUsage",
            Activity::WasteDisposal => "WasteDisposal",
        }
    }

    /// kg CO2 per unit (km driven, kWh used, kg of waste).
    pub fn factor(self) -> f64 {
        match self {
            Activity::Driving => 0.21,
            Activity::ElectricityUsage => 0.527,
            Activity::WasteDisposal => 0.06,
        }
    }
}

/// Unknown labels have a factor of 0.
pub fn calculate_carbon(activity: &str, amount: f64) -> f64 {
    Activity::parse(activity).map_or(0.0, Activity::factor) * amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driving_one_hundred_km() {
        assert_eq!(calculate_carbon("Driving", 100.0), 21.0);
    }

    #[test]
    fn known_activities_scale_linearly() {
        for activity in Activity::ALL {
            for amount in [0.0, 1.0, 2.5, 40.0, 1234.5] {
                let got = calculate_carbon(activity.label(), amount);
                assert!((got - activity.factor() * amount).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn unknown_activity_yields_zero() {
        assert_eq!(calculate_carbon("Flying", 500.0), 0.0);
        assert_eq!(calculate_carbon("driving", 10.0), 0.0);
        assert_eq!(calculate_carbon("", 10.0), 0.0);
    }

    #[test]
    fn parse_round_trips_labels() {
        for activity in Activity::ALL {
            assert_eq!(Activity::parse(activity.label()), Some(activity));
        }
    }
}
