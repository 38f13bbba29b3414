use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Result, Type,
    Visibility, ext::IdentExt, parse_macro_input,
};

/// Derive `argbind::Bindable` for a struct with named fields.
///
/// Every non-private field is bound under its dash-cased name. Scalar,
/// collection and `Option<scalar>` fields take values; any other field type
/// is treated as a nested struct whose keys carry the field's key as prefix.
///
/// Types are recognized by their last path segment. Durations are spelled
/// `TimeDelta`; a field written with chrono's `Duration` alias needs
/// `#[bind(value)]`.
///
/// ```ignore
/// #[derive(Default, argbind::Bind)]
/// #[bind(default)]
/// pub struct DatabaseConfig {
///     pub use_ssl: bool,
///     #[bind(rename = "labels")]
///     pub tags: Vec<String>,
///     #[bind(skip)]
///     pub cache: Vec<u8>,
/// }
/// ```
///
/// Field attributes:
/// - `skip`: leave the field alone
/// - `rename = "key"`: use `key` instead of the dash-cased field name
/// - `value` / `nested`: override how the field type is classified
///
/// Container attribute `default` lets an empty `Option<Self>` slot be filled
/// with `Default::default()` before binding into it.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_bind(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Value,
    OptionalValue,
    Nested,
    OptionalNested,
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    rename: Option<LitStr>,
    force_value: bool,
    force_nested: bool,
}

fn expand_bind(input: DeriveInput) -> Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            name.span(),
            "Bind can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            name.span(),
            "Bind requires a struct with named fields",
        ));
    };

    let container_default = parse_container_attrs(&input)?;

    let mut statements = Vec::new();
    for field in &fields.named {
        if matches!(field.vis, Visibility::Inherited) {
            continue;
        }
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };

        let ident_str = LitStr::new(&ident.unraw().to_string(), ident.span());
        let field_name = match &attrs.rename {
            Some(key) => quote!(::argbind::FieldName::renamed(#ident_str, #key)),
            None => quote!(::argbind::FieldName::new(#ident_str)),
        };

        let kind = classify(&field.ty, &attrs);
        statements.push(match kind {
            FieldKind::Value => quote! {
                binder.value(#field_name, &mut self.#ident);
            },
            FieldKind::OptionalValue => quote! {
                binder.optional_value(#field_name, &mut self.#ident);
            },
            FieldKind::Nested => quote! {
                binder.nested(#field_name, &mut self.#ident)?;
            },
            FieldKind::OptionalNested => quote! {
                binder.optional_nested(#field_name, &mut self.#ident)?;
            },
        });
    }

    let instantiate = if container_default {
        quote! {
            fn instantiate() -> ::core::option::Option<Self> {
                ::core::option::Option::Some(::core::default::Default::default())
            }
        }
    } else {
        quote!()
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::argbind::Bindable for #name #ty_generics #where_clause {
            fn bind_fields(
                &mut self,
                binder: &::argbind::Binder<'_>,
            ) -> ::core::result::Result<(), ::argbind::BindError> {
                #(#statements)*
                ::core::result::Result::Ok(())
            }

            #instantiate
        }
    })
}

fn parse_container_attrs(input: &DeriveInput) -> Result<bool> {
    let mut default = false;
    for attr in &input.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("unknown container attribute, expected `default`"))
            }
        })?;
    }
    Ok(default)
}

fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("rename") {
                let key: LitStr = meta.value()?.parse()?;
                if key.value().trim().is_empty() {
                    return Err(syn::Error::new(key.span(), "rename key cannot be empty"));
                }
                attrs.rename = Some(key);
            } else if meta.path.is_ident("value") {
                attrs.force_value = true;
            } else if meta.path.is_ident("nested") {
                attrs.force_nested = true;
            } else {
                return Err(meta.error(
                    "unknown field attribute, expected `skip`, `rename`, `value` or `nested`",
                ));
            }
            Ok(())
        })?;
    }
    if attrs.force_value && attrs.force_nested {
        return Err(syn::Error::new_spanned(
            field,
            "`value` and `nested` cannot be combined",
        ));
    }
    Ok(attrs)
}

/// Types read straight out of the parsed values.
const VALUE_TYPES: &[&str] = &[
    "String",
    "bool",
    "i16",
    "i32",
    "i64",
    "u16",
    "u32",
    "u64",
    "f32",
    "f64",
    "Decimal",
    "Uuid",
    "NaiveDateTime",
    "DateTime",
    "TimeDelta",
    "Value",
    "Vec",
    "Box",
];

fn classify(ty: &Type, attrs: &FieldAttrs) -> FieldKind {
    let option_inner = option_inner(ty);
    let is_value = |ty: &Type| {
        if attrs.force_value {
            true
        } else if attrs.force_nested {
            false
        } else {
            is_value_type(ty)
        }
    };
    match option_inner {
        Some(inner) if is_value(inner) => FieldKind::OptionalValue,
        Some(_) => FieldKind::OptionalNested,
        None if is_value(ty) => FieldKind::Value,
        None => FieldKind::Nested,
    }
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn is_value_type(ty: &Type) -> bool {
    match last_segment(ty) {
        Some(segment) => VALUE_TYPES.iter().any(|name| segment.ident == *name),
        // Arrays, slices and the like have no nested fields to visit.
        None => true,
    }
}
