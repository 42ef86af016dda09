use crate::utils::{apply_derives, ensure_leading_fields, parse_bool, snake_case};
use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Item, ItemStruct, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream,
    parse_macro_input,
};

/// #[model_object] 宏实现
/// - 若缺失则追加持久化元数据字段，并置于字段最前
/// - 合并 derive：Debug（可关闭）、Default、Serialize、Deserialize
/// - 生成 `::r01f_domain::model_object::ModelObject` 实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as ModelObjectAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[model_object] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let Some(oid_ty) = cfg.oid_ty else {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[model_object] requires `oid = OidType`",
        )
        .to_compile_error()
        .into();
    };

    let vis = st.vis.clone();
    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let required: Vec<(&str, Type)> = vec![
        ("oid", syn::parse_quote! { ::std::option::Option<#oid_ty> }),
        ("numeric_id", syn::parse_quote! { ::std::option::Option<u64> }),
        (
            "entity_version",
            syn::parse_quote! { ::r01f_domain::value_object::EntityVersion },
        ),
        (
            "tracking",
            syn::parse_quote! { ::r01f_domain::value_object::TrackingInfo },
        ),
    ];
    ensure_leading_fields(fields_named, &required, &vis);

    let mut derives: Vec<syn::Path> = vec![
        syn::parse_quote!(Default),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    if cfg.derive_debug.unwrap_or(true) {
        derives.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, derives);

    // 报文可省略元数据字段（新对象），缺失字段取 Default
    let has_serde_default = st.attrs.iter().any(|a| {
        a.path().is_ident("serde") && a.meta.to_token_stream().to_string().contains("default")
    });
    if !has_serde_default {
        st.attrs.push(syn::parse_quote!(#[serde(default)]));
    }

    let out_struct = ItemStruct { ..st };
    let ident = &out_struct.ident;
    let tag = cfg
        .tag
        .map(|lit| lit.value())
        .unwrap_or_else(|| snake_case(&ident.to_string()));
    let (impl_generics, ty_generics, where_clause) = out_struct.generics.split_for_impl();

    let expanded = quote! {
        #out_struct

        impl #impl_generics ::r01f_domain::model_object::ModelObject for #ident #ty_generics #where_clause {
            const TYPE: &'static str = #tag;

            type Oid = #oid_ty;

            fn oid(&self) -> ::std::option::Option<&Self::Oid> { self.oid.as_ref() }

            fn set_oid(&mut self, oid: Self::Oid) { self.oid = ::std::option::Option::Some(oid); }

            fn numeric_id(&self) -> ::std::option::Option<u64> { self.numeric_id }

            fn set_numeric_id(&mut self, numeric_id: u64) {
                self.numeric_id = ::std::option::Option::Some(numeric_id);
            }

            fn entity_version(&self) -> ::r01f_domain::value_object::EntityVersion {
                self.entity_version
            }

            fn set_entity_version(&mut self, version: ::r01f_domain::value_object::EntityVersion) {
                self.entity_version = version;
            }

            fn tracking(&self) -> &::r01f_domain::value_object::TrackingInfo { &self.tracking }

            fn tracking_mut(&mut self) -> &mut ::r01f_domain::value_object::TrackingInfo {
                &mut self.tracking
            }
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct ModelObjectAttrConfig {
    oid_ty: Option<Type>,
    tag: Option<LitStr>,
    derive_debug: Option<bool>,
}

impl Parse for ModelObjectAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            oid_ty: None,
            tag: None,
            derive_debug: None,
        };

        let elems: Punctuated<ModelObjectAttrElem, Token![,]> =
            Punctuated::parse_terminated(input)?;

        for elem in elems {
            match elem {
                ModelObjectAttrElem::Oid(ty) => {
                    if cfg.oid_ty.is_some() {
                        return Err(syn::Error::new(ty.span(), "duplicate key 'oid'"));
                    }
                    cfg.oid_ty = Some(*ty);
                }
                ModelObjectAttrElem::Tag(lit) => {
                    if cfg.tag.is_some() {
                        return Err(syn::Error::new(lit.span(), "duplicate key 'tag'"));
                    }
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'tag' must not be empty"));
                    }
                    cfg.tag = Some(lit);
                }
                ModelObjectAttrElem::Debug(b) => {
                    if cfg.derive_debug.is_some() {
                        return Err(syn::Error::new(
                            proc_macro2::Span::call_site(),
                            "duplicate key 'debug'",
                        ));
                    }
                    cfg.derive_debug = Some(b);
                }
            }
        }

        Ok(cfg)
    }
}

enum ModelObjectAttrElem {
    Oid(Box<Type>),
    Tag(LitStr),
    Debug(bool),
}

impl Parse for ModelObjectAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "oid" {
            Ok(Self::Oid(Box::new(input.parse()?)))
        } else if key == "tag" {
            Ok(Self::Tag(input.parse()?))
        } else if key == "debug" {
            Ok(Self::Debug(parse_bool(input.parse()?, "debug")?))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'oid', 'tag' or 'debug'",
            ))
        }
    }
}
