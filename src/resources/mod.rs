//! Idempotent resource primitives (check + apply pattern).
pub mod fs;
pub mod symlink;
pub mod template_file;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
///
/// Resources that can determine their own on-disk state implement the richer
/// [`Resource`] super-trait as well.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Update the resource to match the desired state
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, invalid paths, or rendering failures.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of an on-disk resource.
///
/// # Examples
///
/// ```
/// use knightos_sdk::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "points to /old/kernel.rom".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(wrong, ResourceState::Missing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use knightos_sdk::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, ResourceChange::AlreadyCorrect);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

/// Resources that can inspect their own state before applying.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}
