//! Factor-graph evaluation: turns calculated measures into qualitative
//! ratings for every product factor and quality aspect of a
//! [`QualityModel`]. One [`Evaluator`] serves exactly one run; its caches
//! never survive into the next.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::measures::MeasureValue;
use crate::quamoco::{FactorId, ImpactWeight, QualityModel};

/// Qualitative verdict for one factor or aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    StronglyPositive,
    Positive,
    Neutral,
    Negative,
    StronglyNegative,
    Unknown,
}

impl Rating {
    /// Numeric position on the lattice; `None` for Unknown.
    pub fn score(&self) -> Option<i8> {
        match self {
            Rating::StronglyPositive => Some(2),
            Rating::Positive => Some(1),
            Rating::Neutral => Some(0),
            Rating::Negative => Some(-1),
            Rating::StronglyNegative => Some(-2),
            Rating::Unknown => None,
        }
    }

    fn from_score(score: f64) -> Self {
        if score >= 1.5 {
            Rating::StronglyPositive
        } else if score >= 0.5 {
            Rating::Positive
        } else if score > -0.5 {
            Rating::Neutral
        } else if score > -1.5 {
            Rating::Negative
        } else {
            Rating::StronglyNegative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::StronglyPositive => "strongly positive",
            Rating::Positive => "positive",
            Rating::Neutral => "neutral",
            Rating::Negative => "negative",
            Rating::StronglyNegative => "strongly negative",
            Rating::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ImpactWeight {
    /// How a source factor's rating arrives at the target: a positive
    /// impact passes it through, a strong impact doubles its distance from
    /// neutral, a negative impact mirrors it. Total over all six ratings.
    pub fn apply(&self, rating: Rating) -> Rating {
        let Some(score) = rating.score() else {
            return Rating::Unknown;
        };
        let factor = match self {
            ImpactWeight::Positive => 1,
            ImpactWeight::StronglyPositive => 2,
            ImpactWeight::Negative => -1,
            ImpactWeight::StronglyNegative => -2,
        };
        Rating::from_score((score as f64 * factor as f64).clamp(-2.0, 2.0))
    }
}

/// Majority-with-magnitude combination: average the scores of the known
/// inputs, then snap back onto the lattice. All-unknown stays Unknown.
pub fn aggregate(ratings: &[Rating]) -> Rating {
    let known: Vec<i8> = ratings.iter().filter_map(Rating::score).collect();
    if known.is_empty() {
        return Rating::Unknown;
    }
    let mean = known.iter().map(|s| *s as f64).sum::<f64>() / known.len() as f64;
    Rating::from_score(mean)
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedFactor {
    pub id: FactorId,
    pub name: String,
    pub rating: Rating,
    pub reasoning: String,
}

/// Full result of one evaluation run. Every factor and aspect of the model
/// appears, rated Unknown where it could not be determined.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub product_factors: BTreeMap<String, EvaluatedFactor>,
    pub quality_aspects: BTreeMap<String, EvaluatedFactor>,
}

type FactorRule = fn(&BTreeMap<String, MeasureValue>) -> (Rating, String);

/// Single-run evaluator over a validated [`QualityModel`].
pub struct Evaluator<'a> {
    model: &'a QualityModel,
    measures: BTreeMap<String, MeasureValue>,
    rules: HashMap<FactorId, FactorRule>,
    memo: HashMap<FactorId, EvaluatedFactor>,
    in_progress: HashSet<FactorId>,
}

impl<'a> Evaluator<'a> {
    pub fn new(model: &'a QualityModel, measures: BTreeMap<String, MeasureValue>) -> Self {
        Self {
            model,
            measures,
            rules: default_rules(),
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Replace the rule for one factor. Mainly for tests and custom
    /// catalogs.
    pub fn set_rule(&mut self, factor: FactorId, rule: FactorRule) {
        self.rules.insert(factor, rule);
    }

    /// Evaluate every product factor and quality aspect. Consumes the
    /// evaluator so the memo cannot leak into a later run.
    pub fn evaluate(mut self) -> EvaluationReport {
        let mut product_factors = BTreeMap::new();
        for factor in &self.model.product_factors {
            let evaluated = self.evaluate_factor(&factor.id);
            product_factors.insert(factor.id.to_string(), evaluated);
        }

        let mut quality_aspects = BTreeMap::new();
        for aspect in &self.model.quality_aspects {
            let applied = self.applied_impacts(&aspect.id);
            let rating = aggregate(&applied);
            let reasoning = if applied.is_empty() {
                "no impacting factors".to_string()
            } else {
                format!(
                    "aggregated from {} impacting factor(s)",
                    applied.len()
                )
            };
            quality_aspects.insert(
                aspect.id.to_string(),
                EvaluatedFactor {
                    id: aspect.id.clone(),
                    name: aspect.name.clone(),
                    rating,
                    reasoning,
                },
            );
        }

        EvaluationReport {
            product_factors,
            quality_aspects,
        }
    }

    fn evaluate_factor(&mut self, id: &FactorId) -> EvaluatedFactor {
        if let Some(done) = self.memo.get(id) {
            return done.clone();
        }

        let name = self
            .model
            .product_factor(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| id.to_string());

        // A factor re-entered while still being evaluated is part of an
        // impact cycle; its contribution is Unknown, not a recursion.
        if !self.in_progress.insert(id.clone()) {
            return EvaluatedFactor {
                id: id.clone(),
                name,
                rating: Rating::Unknown,
                reasoning: "impact cycle; contribution treated as unknown".to_string(),
            };
        }

        let mut inputs: Vec<Rating> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();

        if let Some(rule) = self.rules.get(id).copied() {
            let (rating, reason) = rule(&self.measures);
            inputs.push(rating);
            reasons.push(reason);
        }

        let applied = self.applied_impacts(id);
        if !applied.is_empty() {
            reasons.push(format!("{} impacting factor(s)", applied.len()));
            inputs.extend(applied);
        }

        let rating = aggregate(&inputs);
        let reasoning = if reasons.is_empty() {
            "no evaluation rule registered".to_string()
        } else {
            reasons.join("; ")
        };

        self.in_progress.remove(id);
        let evaluated = EvaluatedFactor {
            id: id.clone(),
            name,
            rating,
            reasoning,
        };
        self.memo.insert(id.clone(), evaluated.clone());
        evaluated
    }

    /// Ratings of all factors impacting `target`, each passed through its
    /// impact weight.
    fn applied_impacts(&mut self, target: &FactorId) -> Vec<Rating> {
        let edges: Vec<(FactorId, ImpactWeight)> = self
            .model
            .impacts_into(target)
            .into_iter()
            .map(|i| (i.source.clone(), i.weight))
            .collect();

        edges
            .into_iter()
            .map(|(source, weight)| weight.apply(self.evaluate_factor(&source).rating))
            .collect()
    }
}

fn measure(measures: &BTreeMap<String, MeasureValue>, key: &str) -> Option<f64> {
    measures.get(key).and_then(MeasureValue::as_f64)
}

/// Rate a [0,1] ratio where more is better.
fn rate_high(value: f64) -> Rating {
    if value >= 0.9 {
        Rating::StronglyPositive
    } else if value >= 0.6 {
        Rating::Positive
    } else if value >= 0.4 {
        Rating::Neutral
    } else if value >= 0.1 {
        Rating::Negative
    } else {
        Rating::StronglyNegative
    }
}

/// Rate a [0,1] ratio where less is better.
fn rate_low(value: f64) -> Rating {
    rate_high(1.0 - value.clamp(0.0, 1.0))
}

/// Rate a replica or shard count: one instance is a single point of
/// failure, two is a start, three or more is solid.
fn rate_level(value: f64) -> Rating {
    if value >= 3.0 {
        Rating::StronglyPositive
    } else if value >= 2.0 {
        Rating::Positive
    } else if value > 1.0 {
        Rating::Neutral
    } else {
        Rating::Negative
    }
}

fn ratio_rule(
    measures: &BTreeMap<String, MeasureValue>,
    keys: &[&str],
    rate: fn(f64) -> Rating,
) -> (Rating, String) {
    let known: Vec<(String, f64)> = keys
        .iter()
        .filter_map(|key| measure(measures, key).map(|v| (key.to_string(), v)))
        .collect();
    if known.is_empty() {
        return (
            Rating::Unknown,
            format!("none of the measures {} were applicable", keys.join(", ")),
        );
    }
    let mean = known.iter().map(|(_, v)| v).sum::<f64>() / known.len() as f64;
    let described: Vec<String> = known
        .iter()
        .map(|(key, v)| format!("{key} = {v:.3}"))
        .collect();
    (rate(mean), format!("derived from {}", described.join(", ")))
}

macro_rules! rule {
    ($keys:expr, $rate:expr) => {
        |measures| ratio_rule(measures, $keys, $rate)
    };
}

fn default_rules() -> HashMap<FactorId, FactorRule> {
    let mut rules: HashMap<FactorId, FactorRule> = HashMap::new();
    rules.insert(
        FactorId::new("dataEncryptionInTransit"),
        rule!(
            &[
                "ratioOfExternalEndpointsSupportingTls",
                "ratioOfSecuredLinks"
            ],
            rate_high
        ),
    );
    rules.insert(
        FactorId::new("serviceReplication"),
        rule!(&["serviceReplicationLevel"], rate_level),
    );
    rules.insert(
        FactorId::new("horizontalDataReplication"),
        rule!(&["storageReplicationLevel"], rate_level),
    );
    rules.insert(
        FactorId::new("shardedDataStoreReplication"),
        rule!(&["dataShardingLevel"], rate_level),
    );
    rules.insert(
        FactorId::new("looseCoupling"),
        rule!(&["couplingDegreeBasedOnPotentialCoupling"], rate_high),
    );
    rules.insert(
        FactorId::new("asynchronousCommunication"),
        rule!(
            &[
                "degreeOfAsynchronousCommunication",
                "asynchronousCommunicationUtilization"
            ],
            rate_high
        ),
    );
    rules.insert(
        FactorId::new("functionalDecentralization"),
        rule!(&["degreeOfCouplingInASystem"], rate_low),
    );
    rules.insert(
        FactorId::new("limitedFunctionalScope"),
        rule!(&["interactionDensityBasedOnComponents"], rate_low),
    );
    rules.insert(
        FactorId::new("serviceIndependence"),
        rule!(
            &["directServiceSharing", "transitivelySharedServices"],
            rate_low
        ),
    );
    rules.insert(
        FactorId::new("mostlyStatelessServices"),
        rule!(&["ratioOfStatelessComponents"], rate_high),
    );
    rules.insert(
        FactorId::new("healthAndReadinessChecks"),
        rule!(&["ratioOfServicesThatProvideHealthEndpoints"], rate_high),
    );
    rules.insert(
        FactorId::new("simplicity"),
        rule!(&["interactionDensityBasedOnLinks"], rate_low),
    );
    rules
}
