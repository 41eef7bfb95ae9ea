extern crate proc_macro;
use proc_macro::TokenStream;
use proc_macro2;
use quote::*;
use syn::{parse_macro_input, DeriveInput};

/// derive `Endpoint` for an option struct
///
/// ```ignore
/// #[derive(Serialize, Endpoint)]
/// #[api_name("daily")]
/// #[endpoint(row = "DailyBar", params = "DAILY_PARAMS", fields = "DAILY_FIELDS")]
/// pub struct GetDaily { .. }
/// ```
///
/// an optional `check = "path::to::fn"` adds an endpoint level rule,
/// a struct field named `fields` is used as the caller's field override
#[proc_macro_derive(Endpoint, attributes(api_name, endpoint))]
pub fn derive_endpoint(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let result = match ast.data {
        syn::Data::Struct(ref s) => derive_endpoint_for_struct(&ast, &s.fields),
        _ => panic!("doesn't work with enums or unions yet"),
    };
    TokenStream::from(result)
}

fn derive_endpoint_for_struct(
    ast: &syn::DeriveInput,
    fields: &syn::Fields,
) -> proc_macro2::TokenStream {
    match *fields {
        syn::Fields::Named(ref named) => {
            let has_fields = named
                .named
                .iter()
                .any(|f| f.ident.as_ref().map_or(false, |ident| ident == "fields"));
            impl_endpoint_for_struct(ast, has_fields)
        }
        syn::Fields::Unit => impl_endpoint_for_struct(ast, false),
        syn::Fields::Unnamed(..) => panic!("doesn't work with unnamed fields yet"),
    }
}

fn impl_endpoint_for_struct(ast: &syn::DeriveInput, has_fields: bool) -> proc_macro2::TokenStream {
    let struct_name = &ast.ident;

    let api_name = ast
        .attrs
        .iter()
        .find_map(|attr| {
            if let Ok(syn::Meta::List(metalist)) = attr.parse_meta() {
                if let Some(ident) = metalist.path.get_ident() {
                    if ident == "api_name" {
                        if metalist.nested.len() != 1 {
                            panic!("must have one name in api_name attribute");
                        }
                        return metalist.nested.first().map(nested_meta_to_string);
                    }
                }
            }
            None
        })
        .expect("must have api_name attribute");
    if api_name.is_empty() {
        panic!("api_name must not be empty");
    }

    let endpoint_meta = ast
        .attrs
        .iter()
        .find_map(|attr| {
            if let Ok(syn::Meta::List(metalist)) = attr.parse_meta() {
                if let Some(ident) = metalist.path.get_ident() {
                    if ident == "endpoint" {
                        return Some(metalist.nested);
                    }
                }
            }
            None
        })
        .expect("must have endpoint attribute");

    let name_value = |key: &str| {
        endpoint_meta.iter().find_map(|m| {
            if let syn::NestedMeta::Meta(syn::Meta::NameValue(nv)) = m {
                if nv.path.is_ident(key) {
                    if let syn::Lit::Str(ref strlit) = nv.lit {
                        return Some(strlit.value());
                    }
                }
            }
            None
        })
    };

    let row: syn::Type = syn::parse_str(
        &name_value("row").expect("row must be set in endpoint attribute"),
    )
    .expect("invalid row type in endpoint attribute");
    let params: syn::Path = syn::parse_str(
        &name_value("params").expect("params must be set in endpoint attribute"),
    )
    .expect("invalid params path in endpoint attribute");
    let default_fields: syn::Path = syn::parse_str(
        &name_value("fields").expect("fields must be set in endpoint attribute"),
    )
    .expect("invalid fields path in endpoint attribute");

    let check_block = match name_value("check") {
        Some(check) => {
            let check: syn::Path =
                syn::parse_str(&check).expect("invalid check path in endpoint attribute");
            quote! {
                fn check(&self, options: &serde_json::Map<String, serde_json::Value>) -> crate::Result<()> {
                    #check(options)
                }
            }
        }
        None => quote! {},
    };

    let fields_block = if has_fields {
        quote! {
            fn requested_fields(&self) -> Option<&[String]> {
                self.fields.as_deref()
            }
        }
    } else {
        quote! {}
    };

    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    quote! {
        impl #impl_generics crate::Endpoint for #struct_name #ty_generics #where_clause {
            type Row = #row;

            fn api_name(&self) -> crate::Result<std::borrow::Cow<'static, str>> {
                Ok(std::borrow::Cow::Borrowed(#api_name))
            }

            fn param_specs(&self) -> &'static [crate::ParamSpec] {
                #params
            }

            fn default_fields(&self) -> &'static [&'static str] {
                #default_fields
            }

            fn options(&self) -> crate::Result<serde_json::Map<String, serde_json::Value>> {
                crate::endpoint::options_of(self)
            }

            #fields_block

            #check_block
        }
    }
}

fn nested_meta_to_string(nm: &syn::NestedMeta) -> String {
    match nm {
        syn::NestedMeta::Meta(meta) => match meta {
            syn::Meta::Path(path) => path
                .get_ident()
                .map(|ident| ident.to_string())
                .expect("must be single ident"),
            _ => panic!("must be single path"),
        },
        syn::NestedMeta::Lit(lit) => match lit {
            syn::Lit::Str(litstr) => litstr.value(),
            _ => panic!("must be string literal"),
        },
    }
}
