// purchase_flow/src/core/result.rs

//! Outcome of running processors: collected errors and warnings.

use std::fmt;

use crate::error::ValidationError;

/// Informational notice. Does not block the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingWarning {
  pub processor: String,
  pub message: String,
}

impl fmt::Display for ProcessingWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.processor, self.message)
  }
}

/// Errors and warnings gathered over one or more phases.
///
/// Successful iff no error was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingResult {
  errors: Vec<ValidationError>,
  warnings: Vec<ProcessingWarning>,
}

impl ProcessingResult {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_success(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn has_warnings(&self) -> bool {
    !self.warnings.is_empty()
  }

  pub fn errors(&self) -> &[ValidationError] {
    &self.errors
  }

  pub fn warnings(&self) -> &[ProcessingWarning] {
    &self.warnings
  }

  pub fn push_error(&mut self, processor: impl Into<String>, message: impl Into<String>) {
    self.errors.push(ValidationError {
      processor: processor.into(),
      message: message.into(),
    });
  }

  pub fn push_warning(&mut self, processor: impl Into<String>, message: impl Into<String>) {
    self.warnings.push(ProcessingWarning {
      processor: processor.into(),
      message: message.into(),
    });
  }

  /// Appends everything `other` collected, keeping order.
  pub fn merge(&mut self, other: ProcessingResult) {
    self.errors.extend(other.errors);
    self.warnings.extend(other.warnings);
  }

  pub fn into_parts(self) -> (Vec<ValidationError>, Vec<ProcessingWarning>) {
    (self.errors, self.warnings)
  }
}

/// The reporting channel handed to a single processor.
///
/// Entries are attributed to the processor the accumulator was opened for.
pub struct ResultAccumulator<'a> {
  processor: &'a str,
  result: &'a mut ProcessingResult,
}

impl<'a> ResultAccumulator<'a> {
  pub fn new(processor: &'a str, result: &'a mut ProcessingResult) -> Self {
    Self { processor, result }
  }

  /// Records a validation error. The phase keeps running.
  pub fn error(&mut self, message: impl Into<String>) {
    self.result.push_error(self.processor, message);
  }

  pub fn warn(&mut self, message: impl Into<String>) {
    self.result.push_warning(self.processor, message);
  }

  pub fn processor(&self) -> &str {
    self.processor
  }
}
