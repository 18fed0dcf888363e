//! Run configuration for the scope chain.
//!
//! Parameterizes assignment semantics and nesting limits through plain
//! data (`AssignPolicy`, `EnvConfig`) so hosts can pick a policy per run
//! and tests can exercise each one independently.

/// Environment variable selecting the assign policy.
pub const ASSIGN_POLICY_VAR: &str = "TERN_ASSIGN_POLICY";

/// Environment variable setting the maximum scope depth.
pub const MAX_SCOPE_DEPTH_VAR: &str = "TERN_MAX_SCOPE_DEPTH";

/// What `set` does when no scope in the chain binds the name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssignPolicy {
    /// Create the binding in the global scope.
    ///
    /// Programs can introduce globals by plain assignment, without a
    /// declaration keyword.
    #[default]
    CreateGlobal,
    /// Reject the assignment with `UndeclaredAssignment`.
    Strict,
}

impl AssignPolicy {
    /// Whether an assignment to an unbound name creates a global.
    #[inline]
    pub fn creates_globals(self) -> bool {
        matches!(self, Self::CreateGlobal)
    }

    /// Parse a policy name as accepted in `TERN_ASSIGN_POLICY`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "permissive" | "create-global" | "create_global" => Some(Self::CreateGlobal),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Configuration for one interpreter run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Policy applied by the global scope when `set` finds no binding.
    pub assign_policy: AssignPolicy,
    /// Maximum depth of any scope entered through `Environment`, or
    /// `None` for unlimited. The global scope has depth 0.
    pub max_depth: Option<usize>,
}

impl EnvConfig {
    /// Set the assign policy.
    #[must_use]
    pub fn with_assign_policy(mut self, policy: AssignPolicy) -> Self {
        self.assign_policy = policy;
        self
    }

    /// Set the maximum scope depth.
    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Load configuration from `TERN_ASSIGN_POLICY` and `TERN_MAX_SCOPE_DEPTH`.
    ///
    /// Unset variables keep their defaults. Unparseable values are
    /// reported at `warn` level and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ASSIGN_POLICY_VAR) {
            match AssignPolicy::parse(&raw) {
                Some(policy) => config.assign_policy = policy,
                None => tracing::warn!(
                    var = ASSIGN_POLICY_VAR,
                    value = %raw,
                    "unknown assign policy, keeping default"
                ),
            }
        }

        if let Some(raw) = lookup(MAX_SCOPE_DEPTH_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => config.max_depth = Some(limit),
                _ => tracing::warn!(
                    var = MAX_SCOPE_DEPTH_VAR,
                    value = %raw,
                    "invalid scope depth limit, keeping default"
                ),
            }
        }

        config
    }
}
