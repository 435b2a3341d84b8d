//! # ldtemplate-core
//!
//! Derives JSON-LD documents from plain JSON by evaluating a template tree
//! against the data and merging the result back over it.
//!
//! The pipeline behind [`compile`] is:
//! - **enrich**: copy the data into an arena where every container knows
//!   its parent and, inside sequences, its index;
//! - **eval**: walk template and data together, running template functions
//!   with the enriched node as context;
//! - **serialize**: write the raw context out cycle-safely, dropping
//!   bookkeeping keys;
//! - **merge**: deep-merge the original data over the clean context.
//!
//! Each stage is also usable on its own.

pub mod compile;
pub mod enrich;
pub mod error;
pub mod eval;
pub mod merge;
pub mod serialize;
pub mod template;
pub mod tree;
pub mod value;

pub use compile::{CompiledTemplate, compile};
pub use enrich::enrich_with_parents;
pub use error::{FunctionError, TemplateError};
pub use eval::eval_functions;
pub use merge::deep_extend;
pub use serialize::{
    BOOKKEEPING_SENTINEL, Indent, KeyFilter, TreeView, censor, censor_key, censor_value, is_bookkeeping_key,
    stringify, stringify_cyclic, stringify_value,
};
pub use template::{TemplateFn, TemplateNode};
pub use tree::{EnrichedTree, NodeId, NodeRef, RelationNames};
pub use value::{NodeKind, TreeValue};
