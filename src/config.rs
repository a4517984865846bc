//! Configuration types, validation and the strategy factory
//! Author: kartik4091
//!
//! Settings are plain serde data. Every call to [`AnonymizerSettings::build_two_pass`]
//! constructs fresh strategy instances, so no strategy is ever shared between
//! two documents.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, PatternError, Result};
use crate::patterns::{database, Pattern, PatternCompiler};
use crate::pipeline::{ProcessingConfiguration, TwoPassProcessingConfiguration};
use crate::replacement::{
    ChainStrategy, CompositeStrategy, ConstantStrategy, DecimalDesignationStrip, MaskStrategy,
    MatchCondition, OrganizationCodeRemoval, RemoveStrategy, ReplacementStrategy, TextTransform,
    TransformStrategy,
};
use crate::search::{FixedCodeSearchStrategy, PatternSearchStrategy, SearchStrategy};

/// Validation hook for configuration structs
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), ConfigError>;
}

fn default_true() -> bool {
    true
}

/// Area switches and match filters. Options only gate areas and drop short
/// matches; they have no other side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    pub process_properties: bool,
    pub process_text_boxes: bool,
    pub process_notes: bool,
    pub process_headers: bool,
    pub process_footers: bool,
    /// Matches shorter than this many chars are ignored
    pub min_match_length: usize,
    pub case_sensitive: bool,
    /// Replace every positional occurrence instead of the first occurrence
    /// of each distinct value
    pub replace_every_occurrence: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            process_properties: true,
            process_text_boxes: true,
            process_notes: true,
            process_headers: true,
            process_footers: true,
            min_match_length: 1,
            case_sensitive: true,
            replace_every_occurrence: true,
        }
    }
}

impl Validate for ProcessingOptions {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.min_match_length == 0 {
            return Err(ConfigError::InvalidOption {
                option: "min_match_length".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Where matches come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchSpec {
    Builtin {
        name: String,
    },
    Pattern {
        name: String,
        expression: String,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },
    FixedCodes {
        codes: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionSpec {
    MatchTypeContains { needle: String },
    ValueMatches { expression: String },
    Always,
}

/// What a match becomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplacementSpec {
    Remove,
    Mask,
    Constant {
        value: String,
    },
    DecimalDesignationStrip,
    OrganizationCodeRemoval,
    Composite {
        condition: ConditionSpec,
        then: Box<ReplacementSpec>,
        otherwise: Box<ReplacementSpec>,
    },
    Transform {
        transform: TextTransform,
    },
    Chain {
        steps: Vec<ReplacementSpec>,
    },
}

impl ReplacementSpec {
    /// Mirrors [`ReplacementStrategy::extracts_codes`] without building.
    pub fn extracts_codes(&self) -> bool {
        match self {
            ReplacementSpec::OrganizationCodeRemoval => true,
            ReplacementSpec::Composite { then, otherwise, .. } => {
                then.extracts_codes() || otherwise.extracts_codes()
            }
            ReplacementSpec::Chain { steps } => steps.iter().any(ReplacementSpec::extracts_codes),
            _ => false,
        }
    }

    pub fn build(&self) -> Result<Arc<dyn ReplacementStrategy>> {
        let strategy: Arc<dyn ReplacementStrategy> = match self {
            ReplacementSpec::Remove => Arc::new(RemoveStrategy),
            ReplacementSpec::Mask => Arc::new(MaskStrategy::default()),
            ReplacementSpec::Constant { value } => Arc::new(ConstantStrategy::new(value.clone())),
            ReplacementSpec::DecimalDesignationStrip => Arc::new(DecimalDesignationStrip),
            ReplacementSpec::OrganizationCodeRemoval => Arc::new(OrganizationCodeRemoval::default()),
            ReplacementSpec::Composite {
                condition,
                then,
                otherwise,
            } => Arc::new(CompositeStrategy::new(
                condition.build()?,
                then.build()?,
                otherwise.build()?,
            )),
            ReplacementSpec::Transform { transform } => {
                Arc::new(TransformStrategy::builtin(*transform))
            }
            ReplacementSpec::Chain { steps } => Arc::new(ChainStrategy::new(
                steps.iter().map(ReplacementSpec::build).collect::<Result<Vec<_>>>()?,
            )),
        };
        Ok(strategy)
    }
}

impl Validate for ReplacementSpec {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self {
            ReplacementSpec::Composite {
                condition,
                then,
                otherwise,
            } => {
                if let ConditionSpec::MatchTypeContains { needle } = condition {
                    if needle.is_empty() {
                        return Err(ConfigError::Validation(
                            "match type condition needs a non-empty needle".into(),
                        ));
                    }
                }
                then.validate()?;
                otherwise.validate()
            }
            ReplacementSpec::Chain { steps } => {
                if steps.is_empty() {
                    return Err(ConfigError::Validation("chain has no steps".into()));
                }
                steps.iter().try_for_each(|step| step.validate())
            }
            _ => Ok(()),
        }
    }
}

impl ConditionSpec {
    fn build(&self) -> Result<MatchCondition> {
        Ok(match self {
            ConditionSpec::MatchTypeContains { needle } => MatchCondition::MatchTypeContains(needle.clone()),
            ConditionSpec::ValueMatches { expression } => {
                let regex = RegexBuilder::new(expression).build().map_err(|source| {
                    PatternError::InvalidExpression {
                        name: "condition".into(),
                        source,
                    }
                })?;
                MatchCondition::ValueMatches(regex)
            }
            ConditionSpec::Always => MatchCondition::Always,
        })
    }
}

/// Search and replacement for one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSettings {
    #[serde(default)]
    pub search: Vec<SearchSpec>,
    pub replacement: ReplacementSpec,
}

impl Validate for PassSettings {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        for spec in &self.search {
            if let SearchSpec::FixedCodes { codes } = spec {
                if codes.iter().all(|c| c.trim().is_empty()) {
                    return Err(ConfigError::Validation("fixed code search has no codes".into()));
                }
            }
        }
        self.replacement.validate()
    }
}

impl PassSettings {
    fn build(
        &self,
        label: &str,
        options: &ProcessingOptions,
        compiler: &PatternCompiler,
    ) -> Result<ProcessingConfiguration> {
        let mut strategies: Vec<Arc<dyn SearchStrategy>> = Vec::with_capacity(self.search.len());
        for spec in &self.search {
            strategies.push(build_search(spec, options, compiler)?);
        }
        debug!(pass = label, strategies = strategies.len(), "Built pass configuration");
        Ok(ProcessingConfiguration::new(
            strategies,
            self.replacement.build()?,
            options.clone(),
        ))
    }
}

fn build_search(
    spec: &SearchSpec,
    options: &ProcessingOptions,
    compiler: &PatternCompiler,
) -> Result<Arc<dyn SearchStrategy>> {
    let with_case = |mut pattern: Pattern| {
        // A case-insensitive run overrides every pattern's own flag.
        if !options.case_sensitive {
            pattern.case_sensitive = false;
        }
        pattern
    };
    let strategy: Arc<dyn SearchStrategy> = match spec {
        SearchSpec::Builtin { name } => {
            let pattern = with_case(database::builtin(name)?);
            Arc::new(PatternSearchStrategy::new(name.clone(), vec![pattern], compiler)?)
        }
        SearchSpec::Pattern {
            name,
            expression,
            case_sensitive,
        } => {
            let pattern = with_case(Pattern::new(name.clone(), expression.clone(), *case_sensitive));
            Arc::new(PatternSearchStrategy::new(name.clone(), vec![pattern], compiler)?)
        }
        SearchSpec::FixedCodes { codes } => Arc::new(FixedCodeSearchStrategy::new(
            codes.iter().cloned(),
            options.case_sensitive,
        )?),
    };
    Ok(strategy)
}

/// Complete anonymizer settings as loaded from a JSON or YAML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerSettings {
    pub options: ProcessingOptions,
    pub pattern_timeout_ms: u64,
    pub first_pass: PassSettings,
    pub second_pass: PassSettings,
}

impl Default for AnonymizerSettings {
    fn default() -> Self {
        let builtin = |name: &str| SearchSpec::Builtin { name: name.into() };
        Self {
            options: ProcessingOptions::default(),
            pattern_timeout_ms: 1000,
            first_pass: PassSettings {
                search: vec![
                    builtin(database::DESIGNATION),
                    builtin(database::EMAIL),
                    builtin(database::PHONE),
                    builtin(database::PERSON_NAME),
                ],
                replacement: ReplacementSpec::Composite {
                    condition: ConditionSpec::MatchTypeContains {
                        needle: database::DESIGNATION.into(),
                    },
                    then: Box::new(ReplacementSpec::OrganizationCodeRemoval),
                    otherwise: Box::new(ReplacementSpec::Mask),
                },
            },
            second_pass: PassSettings {
                search: Vec::new(),
                replacement: ReplacementSpec::Remove,
            },
        }
    }
}

impl Validate for AnonymizerSettings {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.options.validate()?;
        if self.pattern_timeout_ms == 0 {
            return Err(ConfigError::InvalidOption {
                option: "pattern_timeout_ms".into(),
                reason: "must be positive".into(),
            });
        }
        if self.first_pass.search.is_empty() {
            return Err(ConfigError::NoSearchStrategy("first".into()));
        }
        if !self.first_pass.replacement.extracts_codes() {
            return Err(ConfigError::MissingCodeExtraction);
        }
        self.first_pass.validate()?;
        self.second_pass.validate()
    }
}

impl AnonymizerSettings {
    /// Loads settings by extension; unknown extensions try JSON, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let settings: Self = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(_) => serde_yaml::from_str(&content)?,
            },
        };
        settings.validate()?;
        debug!(path = %path.display(), "Loaded anonymizer settings");
        Ok(settings)
    }

    pub fn pattern_timeout(&self) -> Duration {
        Duration::from_millis(self.pattern_timeout_ms)
    }

    /// Validates and builds fresh strategy instances for both passes.
    pub fn build_two_pass(&self) -> Result<TwoPassProcessingConfiguration> {
        self.validate()?;
        let compiler = PatternCompiler::new(self.pattern_timeout());
        Ok(TwoPassProcessingConfiguration {
            first_pass: self.first_pass.build("first", &self.options, &compiler)?,
            second_pass: self.second_pass.build("second", &self.options, &compiler)?,
        })
    }
}
