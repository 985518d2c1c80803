use crate::util::{apply_case, is_known_case, option_inner};
use darling::{FromDeriveInput, FromField, ast::Data};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Error, Generics, Ident, Type, Visibility, ext::IdentExt};

///
/// RecordInput
///

#[derive(FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct RecordInput {
    ident: Ident,
    vis: Visibility,
    generics: Generics,
    data: Data<(), RecordField>,

    #[darling(default)]
    name: Option<String>,

    #[darling(default)]
    rename_all: Option<String>,
}

///
/// RecordField
///

#[derive(FromField)]
#[darling(attributes(record))]
struct RecordField {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    id: bool,

    #[darling(default)]
    nullable: bool,

    #[darling(default)]
    rename: Option<String>,
}

///
/// Attribute
/// One resolved attribute: Rust field, stored name, attribute type.
///

struct Attribute<'a> {
    ident: &'a Ident,
    name: String,
    ty: TokenStream,
}

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let record = match RecordInput::from_derive_input(&input) {
        Ok(record) => record,
        Err(err) => return err.write_errors(),
    };

    expand(&record).unwrap_or_else(|err| err.to_compile_error())
}

fn expand(record: &RecordInput) -> Result<TokenStream, Error> {
    let ident = &record.ident;
    if !record.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &record.generics,
            "Record cannot be derived for generic structs",
        ));
    }
    if let Some(rule) = &record.rename_all
        && !is_known_case(rule)
    {
        return Err(Error::new_spanned(
            ident,
            format!("unsupported rename_all rule \"{rule}\""),
        ));
    }

    let Some(fields) = record.data.as_ref().take_struct() else {
        return Err(Error::new_spanned(
            ident,
            "Record can only be derived for structs with named fields",
        ));
    };

    let mut attributes = Vec::with_capacity(fields.len());
    let mut identity: Option<usize> = None;
    for field in fields.fields {
        let attribute = resolve_field(field, record.rename_all.as_deref())?;

        if field.id {
            if identity.is_some() {
                return Err(Error::new_spanned(
                    &field.ty,
                    "only one attribute can be marked #[record(id)]",
                ));
            }
            if option_inner(&field.ty).is_some() {
                return Err(Error::new_spanned(
                    &field.ty,
                    "the identity attribute cannot be optional",
                ));
            }
            identity = Some(attributes.len());
        }

        attributes.push(attribute);
    }

    let record_name = record.name.clone().unwrap_or_else(|| ident.unraw().to_string());
    let identity = identity.map(|index| &attributes[index]);

    let record_impl = record_impl(ident, &record_name, &attributes, identity);
    let value_impls = value_impls(ident);
    let criteria = criteria_struct(ident, &record.vis, &attributes);

    Ok(quote! {
        #record_impl
        #value_impls
        #criteria
    })
}

fn resolve_field<'a>(
    field: &'a RecordField,
    rename_all: Option<&str>,
) -> Result<Attribute<'a>, Error> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(Error::new_spanned(&field.ty, "Record fields must be named"));
    };

    let name = field
        .rename
        .clone()
        .unwrap_or_else(|| apply_case(&ident.unraw().to_string(), rename_all));

    let ty = if field.nullable {
        let Some(inner) = option_inner(&field.ty) else {
            return Err(Error::new_spanned(
                &field.ty,
                "#[record(nullable)] requires an Option<T> field",
            ));
        };
        quote!(::quarry::criteria::Nullable<#inner>)
    } else {
        let ty = &field.ty;
        quote!(#ty)
    };

    Ok(Attribute { ident, name, ty })
}

// ---------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------

fn record_impl(
    ident: &Ident,
    record_name: &str,
    attributes: &[Attribute<'_>],
    identity: Option<&Attribute<'_>>,
) -> TokenStream {
    let criteria = format_ident!("{}Criteria", ident);

    let model_fields = attributes.iter().map(|Attribute { name, ty, .. }| {
        quote! {
            ::quarry::model::FieldModel::new(
                #name,
                <#ty as ::quarry::traits::AttributeType>::kind(),
            )
        }
    });

    let identity_name = match identity {
        Some(attribute) => {
            let name = &attribute.name;
            quote!(::std::option::Option::Some(#name))
        }
        None => quote!(::std::option::Option::None),
    };

    let identity_value = match identity {
        Some(Attribute { ident, ty, .. }) => quote! {
            <#ty as ::quarry::traits::AttributeType>::store(&self.#ident)
        },
        None => quote!(::std::option::Option::None),
    };

    let store_fields = attributes.iter().map(|Attribute { ident, name, ty }| {
        quote! {
            if let ::std::option::Option::Some(value) =
                <#ty as ::quarry::traits::AttributeType>::store(&self.#ident)
            {
                document.insert(::std::string::String::from(#name), value);
            }
        }
    });

    let load_fields = attributes.iter().map(|Attribute { ident, name, ty }| {
        quote! {
            #ident: ::quarry::traits::load_field::<#ty>(document, #name)?,
        }
    });

    quote! {
        impl ::quarry::traits::Record for #ident {
            type Criteria = #criteria<Self>;

            fn model() -> &'static ::quarry::model::RecordModel {
                static MODEL: ::std::sync::OnceLock<::quarry::model::RecordModel> =
                    ::std::sync::OnceLock::new();

                MODEL.get_or_init(|| {
                    ::quarry::model::RecordModel::new(
                        #record_name,
                        #identity_name,
                        ::std::vec![#(#model_fields),*],
                    )
                })
            }

            fn to_document(&self) -> ::quarry::value::Document {
                let mut document = ::quarry::value::Document::new();
                #(#store_fields)*

                document
            }

            fn from_document(
                document: &::quarry::value::Document,
            ) -> ::std::result::Result<Self, ::quarry::mapper::ProjectionError> {
                ::std::result::Result::Ok(Self {
                    #(#load_fields)*
                })
            }

            fn identity(&self) -> ::std::option::Option<::quarry::value::Value> {
                #identity_value
            }
        }
    }
}

// A record is itself an attribute type, so records nest.
fn value_impls(ident: &Ident) -> TokenStream {
    let criteria = format_ident!("{}Criteria", ident);

    quote! {
        impl ::quarry::traits::AttributeType for #ident {
            type Operand = Self;
            type Stored = Self;
            type Accessor<R: 'static> = #criteria<R>;

            fn kind() -> ::quarry::model::Kind {
                ::quarry::model::Kind::Record(<Self as ::quarry::traits::Record>::model())
            }

            fn store(stored: &Self) -> ::std::option::Option<::quarry::value::Value> {
                ::std::option::Option::Some(::quarry::traits::FieldValue::to_value(stored))
            }

            fn load(
                value: ::std::option::Option<&::quarry::value::Value>,
            ) -> ::std::result::Result<Self, ::quarry::traits::DecodeError> {
                ::quarry::traits::load_required(value)
            }
        }

        impl ::quarry::traits::FieldValue for #ident {
            fn to_value(&self) -> ::quarry::value::Value {
                ::quarry::value::Value::Record(::quarry::traits::Record::to_document(self))
            }

            fn from_value(value: &::quarry::value::Value) -> ::std::option::Option<Self> {
                <Self as ::quarry::traits::Record>::from_document(value.as_record()?).ok()
            }
        }
    }
}

// ---------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------

fn criteria_struct(ident: &Ident, vis: &Visibility, attributes: &[Attribute<'_>]) -> TokenStream {
    let criteria = format_ident!("{}Criteria", ident);
    let doc = format!("Typed criteria accessors for [`{ident}`].");

    let fields = attributes.iter().map(|Attribute { ident, ty, .. }| {
        quote! {
            #vis #ident: <#ty as ::quarry::traits::AttributeType>::Accessor<R>,
        }
    });

    let clones = attributes.iter().map(|Attribute { ident, .. }| {
        quote! {
            #ident: ::std::clone::Clone::clone(&self.#ident),
        }
    });

    let rooted = attributes.iter().map(|Attribute { ident, name, ty }| {
        quote! {
            #ident: <<#ty as ::quarry::traits::AttributeType>::Accessor<R>
                as ::quarry::traits::Accessor<R>>::rooted(
                path.child(#name, <#ty as ::quarry::traits::AttributeType>::kind()),
            ),
        }
    });

    quote! {
        #[doc = #doc]
        #vis struct #criteria<R: 'static = #ident> {
            #(#fields)*
            __marker: ::std::marker::PhantomData<fn() -> R>,
        }

        impl<R: 'static> ::std::clone::Clone for #criteria<R> {
            fn clone(&self) -> Self {
                Self {
                    #(#clones)*
                    __marker: ::std::marker::PhantomData,
                }
            }
        }

        impl<R: 'static> ::quarry::traits::Accessor<R> for #criteria<R> {
            fn rooted(path: ::quarry::expr::Path) -> Self {
                Self {
                    #(#rooted)*
                    __marker: ::std::marker::PhantomData,
                }
            }
        }
    }
}
