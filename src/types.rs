//! Request types shared by the policy, the batch driver, config, and the CLI.
//!
//! A [`ResizeRequest`] is built once, validated on construction, and never
//! mutated afterwards. Its trigger and target are both [`DimensionRule`]s: a
//! [`DimensionSpec`] naming the axis plus a pixel value.

use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Largest pixel value accepted for a trigger or target.
pub const MAX_DIMENSION: u32 = 9999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("{field} value must be between 1 and {MAX_DIMENSION}, got {value}")]
    OutOfRange { field: &'static str, value: u32 },
}

/// Which axis a trigger or target rule looks at.
///
/// `Either` reads as "either width or height exceeds" for triggers and as
/// "largest dimension of" for targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DimensionSpec {
    Width,
    Height,
    #[default]
    Either,
}

impl fmt::Display for DimensionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DimensionSpec::Width => "width",
            DimensionSpec::Height => "height",
            DimensionSpec::Either => "either",
        })
    }
}

/// An axis selector plus a pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRule {
    pub spec: DimensionSpec,
    pub value: u32,
}

impl DimensionRule {
    pub fn new(spec: DimensionSpec, value: u32) -> Self {
        Self { spec, value }
    }

    /// Reject values outside `1..=MAX_DIMENSION`.
    pub fn validate(self, field: &'static str) -> Result<Self, RequestError> {
        if self.value == 0 || self.value > MAX_DIMENSION {
            return Err(RequestError::OutOfRange {
                field,
                value: self.value,
            });
        }
        Ok(self)
    }
}

/// Everything one batch run needs. Immutable once built.
#[derive(Debug, Clone)]
pub struct ResizeRequest {
    files: Vec<PathBuf>,
    trigger: DimensionRule,
    target: DimensionRule,
    force: bool,
    quality: Quality,
}

impl ResizeRequest {
    /// Validate both rules and build the request.
    ///
    /// Nothing on disk is looked at here; a rejected request never opens a file.
    pub fn new(
        files: Vec<PathBuf>,
        trigger: DimensionRule,
        target: DimensionRule,
        force: bool,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            files,
            trigger: trigger.validate("trigger")?,
            target: target.validate("target")?,
            force,
            quality: Quality::default(),
        })
    }

    /// Use a non-default JPEG quality for re-encoded files.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn trigger(&self) -> DimensionRule {
        self.trigger
    }

    pub fn target(&self) -> DimensionRule {
        self.target
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }
}
