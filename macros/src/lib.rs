use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Upper bound on derived fields; matches `pluto_terminal::security::MAX_REQUEST_FIELDS`.
const MAX_REQUEST_FIELDS: usize = 16;

/// Derives the `RequestFields` trait for structs with named fields.
///
/// The generated impl exposes the field names as ordered request keys and the
/// field contents as string views, in declaration order. Each field type must
/// dereference to `str` (`heapless::String`, `&'static str`, digest newtypes).
///
/// # Example
///
/// ```ignore
/// use pluto_terminal_macros::RequestFields;
///
/// #[derive(RequestFields)]
/// pub struct Payment {
///     amount: heapless::String<7>,
///     #[request(rename = "cardNumber")]
///     card_number: heapless::String<19>,
/// }
/// ```
///
/// This generates:
///
/// ```ignore
/// impl ::pluto_terminal::security::RequestFields for Payment {
///     const KEYS: &'static [&'static str] = &["amount", "cardNumber"];
///
///     fn values(&self) -> ::pluto_terminal::security::FieldValues<'_> {
///         let mut values = ::pluto_terminal::security::FieldValues::new();
///         let _ = values.push(::core::ops::Deref::deref(&self.amount));
///         let _ = values.push(::core::ops::Deref::deref(&self.card_number));
///         values
///     }
/// }
/// ```
///
/// # Requirements
///
/// - The type must be a struct with named fields
/// - At most 16 fields
/// - Without `rename`, the Rust field name is used as the key
#[proc_macro_derive(RequestFields, attributes(request))]
pub fn derive_request_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    &input,
                    "RequestFields can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "RequestFields can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    if fields.len() > MAX_REQUEST_FIELDS {
        return syn::Error::new_spanned(
            &input,
            "RequestFields supports at most 16 fields",
        )
        .to_compile_error()
        .into();
    }

    let mut keys = Vec::with_capacity(fields.len());
    let mut idents = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let mut key = ident.to_string();
        for attr in &field.attrs {
            if !attr.path().is_ident("request") {
                continue;
            }

            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    key = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("unsupported request attribute, expected `rename`"))
                }
            });

            if let Err(err) = parsed {
                return err.to_compile_error().into();
            }
        }

        keys.push(key);
        idents.push(ident);
    }

    let expanded = quote! {
        impl ::pluto_terminal::security::RequestFields for #name {
            const KEYS: &'static [&'static str] = &[#(#keys),*];

            fn values(&self) -> ::pluto_terminal::security::FieldValues<'_> {
                let mut values = ::pluto_terminal::security::FieldValues::new();
                #(
                    let _ = values.push(::core::ops::Deref::deref(&self.#idents));
                )*
                values
            }
        }
    };

    TokenStream::from(expanded)
}
