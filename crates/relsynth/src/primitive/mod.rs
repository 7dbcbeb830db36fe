//! The featurizer as a pipeline primitive.
//!
//! Hosts drive a primitive through a small set of traits: [`Fit`] on
//! training data, [`Produce`] on new data, and [`GetParams`] / [`SetParams`]
//! to move fitted state between instances. [`Primitive`] exposes the static
//! metadata and the hyperparameters.

mod featurizer;
mod hyperparams;
mod metadata;
mod output;
mod params;

pub use featurizer::MultiTableFeaturizer;
pub use hyperparams::{Hyperparams, ReturnResult};
pub use metadata::{
    AlgorithmType, MULTI_TABLE_METADATA, PrimitiveFamily, PrimitiveMetadata, PrimitiveSource,
};
pub use output::{OutputColumn, OutputTable};
pub use params::{FittedState, Params, schema_digest};

use std::time::Duration;

use crate::error::Result;

/// Limits a host may attach to a call.
///
/// Accepted for interface compatibility; every call runs to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub iterations: Option<usize>,
}

impl CallOptions {
    pub fn is_empty(&self) -> bool {
        self.timeout.is_none() && self.iterations.is_none()
    }
}

/// Value of a call plus completion information.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult<T> {
    pub value: T,
    pub has_finished: bool,
    pub iterations_done: Option<usize>,
}

impl<T> CallResult<T> {
    /// A call that ran to completion.
    pub fn finished(value: T) -> Self {
        Self {
            value,
            has_finished: true,
            iterations_done: None,
        }
    }
}

/// Static description and configuration of a primitive.
pub trait Primitive {
    type Hyperparams;

    fn metadata(&self) -> &'static PrimitiveMetadata;

    fn hyperparams(&self) -> &Self::Hyperparams;
}

/// Learn state from training inputs.
pub trait Fit<I> {
    fn fit(&mut self, inputs: &I, options: CallOptions) -> Result<CallResult<()>>;
}

/// Transform inputs using fitted state.
pub trait Produce<I> {
    type Output;

    fn produce(&self, inputs: &I, options: CallOptions) -> Result<CallResult<Self::Output>>;
}

pub trait GetParams {
    type Params;

    fn get_params(&self) -> Self::Params;
}

pub trait SetParams {
    type Params;

    /// Replace the fitted state. Setting empty params makes the primitive
    /// unfitted again.
    fn set_params(&mut self, params: Self::Params) -> Result<()>;
}
