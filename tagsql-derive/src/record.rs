//! Derive macro for the `Record` trait
//!
//! Generates the static field table of a struct: one `tagsql::Field` per field
//! that carries at least one non-empty column annotation, plus the `Element`
//! impls used by record sources and result collections.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashMap;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Fields};

use crate::attributes::parse_column_tags;

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Record can only be derived for structs with named fields",
            ))
        }
    };

    // (key, column) -> field that claimed it
    let mut claimed: HashMap<(String, String), String> = HashMap::new();
    let mut entries: Vec<TokenStream2> = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let tags = parse_column_tags(field)?;
        if tags.is_empty() {
            continue;
        }

        let field_name = ident.unraw().to_string();
        for tag in &tags {
            let slot = (tag.key.clone(), tag.column.clone());
            if let Some(previous) = claimed.get(&slot) {
                return Err(syn::Error::new(
                    tag.span,
                    format!(
                        "column `{}` under key `{}` is already mapped to field `{}`",
                        tag.column, tag.key, previous
                    ),
                ));
            }
            claimed.insert(slot, field_name.clone());
        }

        let ty = &field.ty;
        let type_name = quote!(#ty).to_string().replace(' ', "");
        let pairs = tags.iter().map(|tag| {
            let key = &tag.key;
            let column = &tag.column;
            quote! { (#key, #column) }
        });

        entries.push(quote! {
            ::tagsql::Field::new(
                #field_name,
                #type_name,
                <#ty as ::tagsql::FieldValue>::KIND,
                &[#(#pairs),*],
                |record: &#struct_name| ::tagsql::FieldValue::to_value(&record.#ident),
                |record: &mut #struct_name, value: ::tagsql::Value| {
                    ::tagsql::FieldValue::assign(&mut record.#ident, value)
                },
            )
        });
    }

    Ok(quote! {
        impl ::tagsql::Record for #struct_name {
            fn fields() -> &'static [::tagsql::Field<Self>] {
                static FIELDS: ::tagsql::__private::Lazy<::std::vec::Vec<::tagsql::Field<#struct_name>>> =
                    ::tagsql::__private::Lazy::new(|| ::std::vec![#(#entries),*]);
                FIELDS.as_slice()
            }
        }

        impl ::tagsql::Element for #struct_name {
            type Record = #struct_name;

            fn from_record(record: #struct_name) -> Self {
                record
            }

            fn as_record(&self) -> &#struct_name {
                self
            }
        }

        impl ::tagsql::Element for ::std::boxed::Box<#struct_name> {
            type Record = #struct_name;

            fn from_record(record: #struct_name) -> Self {
                ::std::boxed::Box::new(record)
            }

            fn as_record(&self) -> &#struct_name {
                self
            }
        }
    })
}
