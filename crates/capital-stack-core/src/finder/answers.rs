use serde::{Deserialize, Serialize};

wire_enum! {
    OrgType {
        Nonprofit => "nonprofit",
        CCorp => "c-corp",
        Llc => "llc",
        Cooperative => "cooperative",
        Government => "government",
        NotFormed => "not-formed",
    }
}

wire_enum! {
    OrgStage {
        Idea => "idea",
        Rnd => "rnd",
        Pilot => "pilot",
        Growth => "growth",
        Scale => "scale",
    }
}

impl OrgStage {
    pub fn label(&self) -> &'static str {
        match self {
            OrgStage::Idea => "idea-stage",
            OrgStage::Rnd => "R&D-stage",
            OrgStage::Pilot => "pilot-stage",
            OrgStage::Growth => "growth-stage",
            OrgStage::Scale => "scale-stage",
        }
    }
}

wire_enum! {
    RevenueLevel {
        None => "none",
        Some => "some",
        Consistent => "consistent",
        Large => "large",
    }
}

wire_enum! {
    CapitalNeed {
        Under100k => "under-100k",
        From100kTo1m => "100k-1m",
        From1mTo10m => "1m-10m",
        From10mTo100m => "10m-100m",
        Over100m => "100m-plus",
    }
}

impl CapitalNeed {
    pub fn label(&self) -> &'static str {
        match self {
            CapitalNeed::Under100k => "under $100K",
            CapitalNeed::From100kTo1m => "$100K–$1M",
            CapitalNeed::From1mTo10m => "$1M–$10M",
            CapitalNeed::From10mTo100m => "$10M–$100M",
            CapitalNeed::Over100m => "$100M+",
        }
    }
}

wire_enum! {
    /// How soon the money is needed
    SpeedNeed {
        Asap => "asap",
        FewMonths => "few-months",
        SixPlusMonths => "6-plus-months",
        NoRush => "no-rush",
    }
}

impl SpeedNeed {
    /// Position on the shared timing scale (weeks = 0 .. 6-12 months = 3).
    pub fn ordinal(&self) -> i32 {
        match self {
            SpeedNeed::Asap => 0,
            SpeedNeed::FewMonths => 1,
            SpeedNeed::SixPlusMonths => 2,
            SpeedNeed::NoRush => 3,
        }
    }
}

wire_enum! {
    ComplexityTolerance {
        Simple => "simple",
        Some => "some",
        Complex => "complex",
    }
}

impl ComplexityTolerance {
    pub fn ordinal(&self) -> i32 {
        match self {
            ComplexityTolerance::Simple => 0,
            ComplexityTolerance::Some => 1,
            ComplexityTolerance::Complex => 2,
        }
    }
}

wire_enum! {
    NetworkLevel {
        Deep => "deep",
        Some => "some",
        None => "none",
    }
}

wire_enum! {
    Priority {
        Ownership => "ownership",
        LowestCost => "lowest-cost",
        LargestAmount => "largest-amount",
        Speed => "speed",
        Flexibility => "flexibility",
        Proven => "proven",
    }
}

/// Questionnaire state. Every single-choice field starts unanswered.
///
/// Field names also accept the camelCase spelling used by browser-side stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderAnswers {
    #[serde(default, alias = "orgType")]
    pub org_type: Option<OrgType>,
    #[serde(default)]
    pub stage: Option<OrgStage>,
    #[serde(default)]
    pub revenue: Option<RevenueLevel>,
    #[serde(default, alias = "capitalNeed")]
    pub capital_need: Option<CapitalNeed>,
    #[serde(default, alias = "speedNeed")]
    pub speed_need: Option<SpeedNeed>,
    #[serde(default, alias = "complexityTolerance")]
    pub complexity_tolerance: Option<ComplexityTolerance>,
    #[serde(default)]
    pub network: Option<NetworkLevel>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
}

impl FinderAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_priority(&self, priority: Priority) -> bool {
        self.priorities.contains(&priority)
    }

    /// Add the priority if absent, remove it if present.
    pub fn toggle_priority(&mut self, priority: Priority) {
        if let Some(pos) = self.priorities.iter().position(|p| *p == priority) {
            self.priorities.remove(pos);
        } else {
            self.priorities.push(priority);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_round_trip() {
        for need in CapitalNeed::ALL {
            assert_eq!(need.as_str().parse::<CapitalNeed>().unwrap(), *need);
        }
        assert_eq!("not-formed".parse::<OrgType>().unwrap(), OrgType::NotFormed);
        assert_eq!(
            serde_json::to_string(&SpeedNeed::SixPlusMonths).unwrap(),
            "\"6-plus-months\""
        );
    }

    #[test]
    fn test_unknown_value_rejected() {
        let err = "corp".parse::<OrgType>().unwrap_err();
        assert!(err.to_string().contains("c-corp"));
    }

    #[test]
    fn test_toggle_priority() {
        let mut answers = FinderAnswers::new();
        answers.toggle_priority(Priority::Speed);
        answers.toggle_priority(Priority::Ownership);
        assert_eq!(answers.priorities, vec![Priority::Speed, Priority::Ownership]);
        answers.toggle_priority(Priority::Speed);
        assert_eq!(answers.priorities, vec![Priority::Ownership]);
    }

    #[test]
    fn test_empty_answers_deserialize_from_partial_object() {
        let answers: FinderAnswers = serde_json::from_str(r#"{"stage":"pilot"}"#).unwrap();
        assert_eq!(answers.stage, Some(OrgStage::Pilot));
        assert!(answers.priorities.is_empty());
        assert!(FinderAnswers::new().is_empty());
    }
}
