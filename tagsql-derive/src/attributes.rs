//! Attribute parsing utilities

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, ExprLit, Field, Ident, Lit, LitStr, Meta, Token};

/// Annotation key used by `#[column("name")]` and `#[column = "name"]`
pub const DEFAULT_KEY: &str = "column";

/// One `key -> column name` pair declared on a field
pub struct ColumnTag {
    pub key: String,
    pub column: String,
    pub span: Span,
}

enum TagArg {
    Default(LitStr),
    Keyed(Ident, LitStr),
}

impl Parse for TagArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(TagArg::Default(input.parse()?));
        }
        let key = input.call(Ident::parse_any)?;
        input.parse::<Token![=]>()?;
        Ok(TagArg::Keyed(key, input.parse()?))
    }
}

/// Parse every `#[column(...)]` attribute of a field
///
/// Names are trimmed; pairs whose name is empty are dropped so the field stays
/// unmapped for that key. Declaring the same key twice on one field is an error.
pub fn parse_column_tags(field: &Field) -> syn::Result<Vec<ColumnTag>> {
    let mut tags: Vec<ColumnTag> = Vec::new();

    for attr in &field.attrs {
        if !attr.path().is_ident("column") {
            continue;
        }

        let args: Vec<TagArg> = match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => vec![TagArg::Default(s.clone())],
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected a string literal, e.g. #[column = \"id\"]",
                    ))
                }
            },
            Meta::List(_) => attr
                .parse_args_with(Punctuated::<TagArg, Token![,]>::parse_terminated)?
                .into_iter()
                .collect(),
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected a column name, e.g. #[column(\"id\")]",
                ))
            }
        };

        for arg in args {
            let (key, lit) = match arg {
                TagArg::Default(lit) => (DEFAULT_KEY.to_string(), lit),
                TagArg::Keyed(ident, lit) => (ident.unraw().to_string(), lit),
            };
            if tags.iter().any(|t| t.key == key) {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("annotation key `{key}` is declared more than once on this field"),
                ));
            }
            let column = lit.value().trim().to_string();
            if column.is_empty() {
                continue;
            }
            tags.push(ColumnTag {
                key,
                column,
                span: lit.span(),
            });
        }
    }

    Ok(tags)
}
