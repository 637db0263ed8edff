use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod block;

/// Derives `Block` and `Attribute` for a struct with named fields.
///
/// Every field becomes one attribute of the block's state map, keyed by the
/// field name. Supported attributes:
///
/// - `#[state(rename = "key")]` on a field: use `key` as the state map key.
/// - `#[state(default)]` on a field: the field is optional in the schema and
///   expands to `Default::default()` when absent.
/// - `#[state(default)]` on the struct: as above, for every field.
/// - `#[state(computed)]` on a field: marks the attribute as computed.
/// - `#[state(skip)]` on a field: the field is neither declared, flattened nor
///   expanded. It expands to `Default::default()`.
/// - `#[state(path_overrides(state = "path"))]` on the struct: where the
///   `resource` module lives (defaults to `::kops_state::resource`).
///
/// Doc comments on the struct and its fields become schema descriptions.
#[proc_macro_derive(Block, attributes(state))]
pub fn derive_block(input: TokenStream) -> TokenStream {
    block::derive(parse_macro_input!(input as DeriveInput)).into()
}
