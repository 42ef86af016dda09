use quote::ToTokens;
use syn::{Attribute, Field, FieldsNamed, Token, Type, punctuated::Punctuated};

// 提取非 derive 属性与已有 derive 列表
fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("derive") {
            if let Ok(list) =
                attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// 归一化 derive 的 key，避免 Serialize/serde::Serialize 重复
fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => last.ident.to_string(),
        None => p.to_token_stream().to_string(),
    }
}

/// 合并默认与已有 derive（去重，required 在前），并放在属性列表首位
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);

    let mut seen = std::collections::HashSet::<String>::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    let derive: Attribute = syn::parse_quote!(#[derive(#(#merged),*)]);
    *attrs = std::iter::once(derive).chain(retained).collect();
}

/// 把所需字段按给定顺序放在最前：已存在则复用原定义，否则以 `vis` 可见性新增；
/// 其余字段保持原有相对顺序
pub(crate) fn ensure_leading_fields(
    fields_named: &mut FieldsNamed,
    required: &[(&str, Type)],
    vis: &syn::Visibility,
) {
    let is_named = |f: &Field, name: &str| f.ident.as_ref().is_some_and(|i| i == name);

    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    for (name, ty) in required {
        match old_named.iter().find(|f| is_named(f, name)) {
            Some(existing) => new_named.push(existing.clone()),
            None => {
                let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
                new_named.push(syn::parse_quote! { #vis #ident: #ty });
            }
        }
    }

    for f in old_named {
        if !required.iter().any(|(name, _)| is_named(&f, name)) {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}

/// `PurchaseOrder` -> `purchase_order`
pub(crate) fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// 解析 `key = true|false`
pub(crate) fn parse_bool(expr: syn::Expr, key: &str) -> syn::Result<bool> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Bool(b),
            ..
        }) => Ok(b.value()),
        other => Err(syn::Error::new_spanned(
            other,
            format!("expected boolean literal for '{key}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(tokens: proc_macro2::TokenStream) -> String {
        tokens.to_string().split_whitespace().collect()
    }

    #[test]
    fn snake_case_splits_on_uppercase() {
        assert_eq!(snake_case("PurchaseOrder"), "purchase_order");
        assert_eq!(snake_case("Note"), "note");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn required_fields_move_to_front() {
        let mut fields: FieldsNamed = syn::parse_quote!({ title: String, oid: Option<MyOid> });
        let required: Vec<(&str, Type)> = vec![
            ("oid", syn::parse_quote!(Option<u8>)),
            ("entity_version", syn::parse_quote!(u64)),
        ];
        ensure_leading_fields(&mut fields, &required, &syn::parse_quote!(pub));

        let names: Vec<String> = fields
            .named
            .iter()
            .map(|f| f.ident.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["oid", "entity_version", "title"]);
        assert!(matches!(fields.named[1].vis, syn::Visibility::Public(_)));
        // 已存在的字段保留原类型
        let oid_ty = &fields.named[0].ty;
        assert_eq!(compact(quote::quote!(#oid_ty)), "Option<MyOid>");
    }

    #[test]
    fn derives_are_merged_without_duplicates() {
        let mut attrs: Vec<Attribute> = vec![
            syn::parse_quote!(#[derive(Clone, serde::Serialize)]),
            syn::parse_quote!(#[doc = "x"]),
        ];
        apply_derives(
            &mut attrs,
            vec![syn::parse_quote!(Debug), syn::parse_quote!(Serialize)],
        );
        assert_eq!(attrs.len(), 2);
        let first = &attrs[0];
        assert_eq!(compact(quote::quote!(#first)), "#[derive(Debug,Serialize,Clone)]");
    }
}
