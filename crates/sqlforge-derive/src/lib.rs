//! Derive macros for typed SQL table declarations.
//!
//! This crate provides the `#[derive(Table)]` macro, which turns a struct
//! into table metadata plus typed column handles.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Derives table metadata for a struct, generating typed column accessors.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
///
/// A column is nullable exactly when its field type is an `Option`. Field
/// types must implement `sqlforge_core::types::SqlType`.
///
/// # Generated Items
///
/// For a struct `User`, this macro generates:
///
/// - `UserTable` - A type implementing the `Table` trait, whose
///   `table_ref()` returns one shared `TableRef`
/// - One accessor per field on `UserTable` and `User`, returning a
///   `Column<FieldType>`
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    let mut column_infos: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let column_attrs = parse_column_attrs(&field.attrs)?;
        column_infos.push(ColumnInfo {
            field_name: field_name.clone(),
            field_type: field.ty.clone(),
            column_name: column_attrs
                .name
                .unwrap_or_else(|| field_name.to_string()),
            is_primary_key: column_attrs.primary_key,
        });
    }

    let primary_keys: Vec<&ColumnInfo> = column_infos.iter().filter(|c| c.is_primary_key).collect();
    if primary_keys.len() > 1 {
        return Err(syn::Error::new_spanned(
            &primary_keys[1].field_name,
            "only one column can be the primary key",
        ));
    }

    let table_struct_name = format_ident!("{}Table", struct_name);

    let column_accessors: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let method_name = &info.field_name;
            let field_type = &info.field_type;
            let column_name = &info.column_name;
            quote! {
                /// Returns the typed column handle.
                #[must_use]
                pub fn #method_name() -> ::sqlforge_core::expr::Column<#field_type> {
                    ::sqlforge_core::expr::Column::new(#table_name, #column_name)
                }
            }
        })
        .collect();

    let builder_columns: Vec<TokenStream2> = column_infos
        .iter()
        .map(|info| {
            let field_type = &info.field_type;
            let column_name = &info.column_name;
            quote! {
                .column(#column_name, <#field_type as ::sqlforge_core::types::SqlType>::TAG)
            }
        })
        .collect();

    let all_column_names: Vec<&str> = column_infos
        .iter()
        .map(|c| c.column_name.as_str())
        .collect();

    let (primary_key_impl, primary_key_builder) = match primary_keys.first() {
        Some(pk) => {
            let pk = &pk.column_name;
            (
                quote! { const PRIMARY_KEY: Option<&'static str> = Some(#pk); },
                quote! { .primary_key(#pk) },
            )
        }
        None => (
            quote! { const PRIMARY_KEY: Option<&'static str> = None; },
            quote! {},
        ),
    };

    let expanded = quote! {
        /// Table metadata for `#struct_name`.
        #[derive(Debug, Clone, Copy)]
        pub struct #table_struct_name;

        impl ::sqlforge_core::schema::Table for #table_struct_name {
            const NAME: &'static str = #table_name;
            const COLUMNS: &'static [&'static str] = &[#(#all_column_names),*];
            #primary_key_impl

            fn table_ref() -> ::sqlforge_core::schema::TableRef {
                static TABLE: ::std::sync::OnceLock<::sqlforge_core::schema::TableRef> =
                    ::std::sync::OnceLock::new();
                TABLE
                    .get_or_init(|| {
                        ::sqlforge_core::schema::TableRef::builder(#table_name)
                            #(#builder_columns)*
                            #primary_key_builder
                            .build()
                    })
                    .clone()
            }
        }

        impl #table_struct_name {
            /// Returns the table name.
            #[inline]
            #[must_use]
            pub const fn table_name() -> &'static str {
                #table_name
            }

            #(#column_accessors)*
        }

        impl #struct_name {
            /// Returns the table metadata type.
            #[must_use]
            pub fn table() -> #table_struct_name {
                #table_struct_name
            }

            #(#column_accessors)*
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    is_primary_key: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("table") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    table_name = Some(string_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
