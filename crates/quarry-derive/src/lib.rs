use proc_macro::TokenStream;

mod record;
mod util;

/// Derive `Record` for a struct with named fields.
///
/// Container attributes: `#[record(name = "..", rename_all = "camelCase")]`.
/// Field attributes: `#[record(id)]` marks the identity attribute,
/// `#[record(nullable)]` stores `None` of an `Option<T>` as null instead of
/// absence, and `#[record(rename = "..")]` sets the stored attribute name.
///
/// Alongside the trait impls the derive emits `<Name>Criteria<R>`, the typed
/// accessor struct with one public field per attribute.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
