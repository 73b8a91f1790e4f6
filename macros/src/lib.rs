use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// 为具名字段结构体自动实现 `gconf::bind::Bindable`
///
/// 字段属性：
/// - `#[config("key")]` 或 `#[config(key = "key")]`：指定配置 key，匹配时忽略大小写
/// - `#[config(skip)]`：不参与绑定
///
/// 未指定 key 的字段按字段名匹配，去掉下划线后忽略大小写。
/// 参与绑定的字段类型需实现 `gconf::bind::ParseValue`。
///
/// # 示例
/// ```ignore
/// use gconf::bind::Bindable;
///
/// #[derive(Default, Bindable)]
/// struct Impower {
///     #[config("path")]
///     path: String,
///     period: i32,
/// }
/// ```
#[proc_macro_derive(Bindable, attributes(config))]
pub fn bindable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldAttr {
    key: Option<String>,
    skip: bool,
}

fn parse_field_attr(field: &syn::Field) -> syn::Result<FieldAttr> {
    let mut attr = FieldAttr {
        key: None,
        skip: false,
    };

    for a in field.attrs.iter().filter(|a| a.path().is_ident("config")) {
        // #[config("key")]
        if let Ok(lit) = a.parse_args::<LitStr>() {
            attr.key = Some(lit.value());
            continue;
        }
        // #[config(key = "key")] / #[config(skip)]
        a.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attr.skip = true;
                Ok(())
            } else if meta.path.is_ident("key") {
                let lit: LitStr = meta.value()?.parse()?;
                attr.key = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported config attribute, expected `key` or `skip`"))
            }
        })?;
    }

    // 空 key 等同于未指定，按字段名匹配
    attr.key = attr.key.filter(|k| !k.is_empty());
    Ok(attr)
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "Bindable only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "Bindable only supports structs",
            ))
        }
    };

    let mut descriptors = Vec::new();
    let mut setters = Vec::new();

    for field in fields {
        let attr = parse_field_attr(field)?;
        if attr.skip {
            continue;
        }

        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let ty = &field.ty;
        let name = ident.to_string().trim_start_matches("r#").to_string();

        let key = match &attr.key {
            Some(k) => quote! { ::core::option::Option::Some(#k) },
            None => quote! { ::core::option::Option::None },
        };

        descriptors.push(quote! {
            ::gconf::bind::BindField { name: #name, key: #key }
        });
        setters.push(quote! {
            #name => {
                self.#ident = <#ty as ::gconf::bind::ParseValue>::parse_value(raw)?;
                ::core::result::Result::Ok(())
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::gconf::bind::Bindable for #struct_name #ty_generics #where_clause {
            fn bind_fields() -> &'static [::gconf::bind::BindField] {
                const FIELDS: &[::gconf::bind::BindField] = &[#(#descriptors),*];
                FIELDS
            }

            fn set_field(
                &mut self,
                name: &str,
                raw: &str,
            ) -> ::core::result::Result<(), ::gconf::bind::BindError> {
                match name {
                    #(#setters)*
                    _ => ::core::result::Result::Err(
                        ::gconf::bind::BindError::UnknownField(name.to_string())
                    ),
                }
            }
        }
    })
}
