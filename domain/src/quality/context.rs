//! Project context factors that shift quality thresholds

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Project complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
    Enterprise,
}

/// Experience level of the person driving the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserExperience {
    Novice,
    Intermediate,
    Expert,
}

/// Intended maturity of the product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Prototype,
    Mvp,
    Production,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($ty), other)),
                }
            }
        }
    };
}

str_enum!(Complexity {
    Simple => "simple",
    Medium => "medium",
    Complex => "complex",
    Enterprise => "enterprise",
});

str_enum!(UserExperience {
    Novice => "novice",
    Intermediate => "intermediate",
    Expert => "expert",
});

str_enum!(ProjectType {
    Prototype => "prototype",
    Mvp => "mvp",
    Production => "production",
});

/// Context factors for a scoring call
///
/// Every factor is optional. An unrecognized value deserializes as absent,
/// so a context can never make scoring fail.
///
/// # Example
///
/// ```
/// use stagegate_domain::{QualityContext, ProjectType};
///
/// let ctx: QualityContext =
///     serde_json::from_str(r#"{"projectType": "prototype", "complexity": "galactic"}"#).unwrap();
/// assert_eq!(ctx.project_type, Some(ProjectType::Prototype));
/// assert_eq!(ctx.complexity, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityContext {
    #[serde(deserialize_with = "lenient_factor", skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(deserialize_with = "lenient_factor", skip_serializing_if = "Option::is_none")]
    pub user_experience: Option<UserExperience>,
    #[serde(deserialize_with = "lenient_factor", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
}

impl QualityContext {
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn with_user_experience(mut self, experience: UserExperience) -> Self {
        self.user_experience = Some(experience);
        self
    }

    pub fn with_project_type(mut self, project_type: ProjectType) -> Self {
        self.project_type = Some(project_type);
        self
    }
}

fn lenient_factor<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_factors_case_insensitive() {
        assert_eq!("Enterprise".parse::<Complexity>(), Ok(Complexity::Enterprise));
        assert_eq!(" EXPERT ".parse::<UserExperience>(), Ok(UserExperience::Expert));
        assert_eq!("mvp".parse::<ProjectType>(), Ok(ProjectType::Mvp));
        assert!("huge".parse::<Complexity>().is_err());
    }

    #[test]
    fn test_context_unknown_values_are_absent() {
        let ctx: QualityContext = serde_json::from_str(
            r#"{"complexity": 3, "userExperience": "wizard", "projectType": "production"}"#,
        )
        .unwrap();
        assert_eq!(ctx.complexity, None);
        assert_eq!(ctx.user_experience, None);
        assert_eq!(ctx.project_type, Some(ProjectType::Production));
    }

    #[test]
    fn test_context_serializes_camel_case() {
        let ctx = QualityContext::default().with_user_experience(UserExperience::Novice);
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"userExperience":"novice"}"#);
    }
}
