use std::fmt;

use proc_macro::TokenStream;
use quote::quote;

enum Visibility {
    Public(proc_macro2::Span),
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(..) => "public",
            Self::Private => "private",
        }
        .fmt(f)
    }
}

impl syn::parse::Parse for Visibility {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let identifier = input.parse::<syn::Ident>()?;
        match identifier.to_string().as_str() {
            "public" => Ok(Self::Public(identifier.span())),
            "private" => Ok(Self::Private),
            _ => Err(syn::Error::new_spanned(
                identifier,
                "Unexpected visibility: expected `public` or `private`",
            )),
        }
    }
}

struct EnumTagsArgs {
    visibility: Visibility,
    repr_type: syn::Type,
}

impl syn::parse::Parse for EnumTagsArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        mod kw {
            use syn::custom_keyword;

            custom_keyword!(repr);
        }

        let visibility = input.parse()?;

        input.parse::<syn::Token![,]>().map_err(|mut error| {
            error.combine(syn::Error::new(
                input.span(),
                format!("Missing comma after `{}` visibility", visibility),
            ));
            error
        })?;

        input.parse::<kw::repr>().map_err(|mut error| {
            error.combine(syn::Error::new(
                input.span(),
                format!("Missing `repr` after `{},`", visibility),
            ));
            error
        })?;

        let content;
        syn::parenthesized!(content in input);
        let repr_type = content.parse()?;

        Ok(Self {
            visibility,
            repr_type,
        })
    }
}

/// One variant after discriminant resolution.
struct TaggedVariant {
    name: syn::Ident,
    tag: usize,
    pattern: proc_macro2::TokenStream,
}

/// Walks the variants, resolving implicit discriminants the way `rustc` does:
/// an explicit literal resets the counter, otherwise it counts up by one.
fn resolve_tags(
    variants: impl Iterator<Item = syn::Variant>,
) -> syn::Result<Vec<TaggedVariant>> {
    let mut tagged = vec![];
    let mut next_tag = 0;

    for variant in variants {
        if let Some((_, discriminant)) = variant.discriminant {
            next_tag = match discriminant {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Int(int_literal),
                    ..
                }) => int_literal.base10_parse::<usize>()?,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Only literal discriminants are allowed",
                    ));
                }
            };
        }

        let name = variant.ident;
        let pattern = match variant.fields {
            syn::Fields::Named(_) => quote! { Self::#name { .. } },
            syn::Fields::Unnamed(_) => quote! { Self::#name(..) },
            syn::Fields::Unit => quote! { Self::#name },
        };

        tagged.push(TaggedVariant {
            name,
            tag: next_tag,
            pattern,
        });
        next_tag += 1;
    }

    Ok(tagged)
}

fn impl_enum_tags(
    enum_visibility: syn::Visibility,
    enum_name: syn::Ident,
    repr_type: syn::Type,
    variants: &[TaggedVariant],
) -> proc_macro2::TokenStream {
    let mut tag_consts = vec![];
    let mut tag_cases = vec![];
    let mut mnemonic_cases = vec![];

    for TaggedVariant { name, tag, pattern } in variants {
        let tag_ident = quote::format_ident!(
            "{}_TAG",
            name.to_string().to_ascii_uppercase()
        );
        let mnemonic = name.to_string().to_ascii_lowercase();

        tag_consts.push(quote! {
            #[doc = concat!("`#[enum_tags]`-generated tag for the variant `Self::", stringify!(#name), "`.")]
            #enum_visibility const #tag_ident: #repr_type = #tag as _;
        });
        tag_cases.push(quote! { #pattern => #tag as _ });
        mnemonic_cases.push(quote! { #pattern => #mnemonic });
    }

    quote! {
        impl #enum_name {
            #(#tag_consts)*

            #[doc = "`#[enum_tags]`-generated getter for this variant's tag."]
            #enum_visibility const fn tag(&self) -> #repr_type {
                match self {
                    #(#tag_cases),*
                }
            }

            #[doc = "`#[enum_tags]`-generated lowercase name of this variant."]
            #enum_visibility const fn mnemonic(&self) -> &'static str {
                match self {
                    #(#mnemonic_cases),*
                }
            }
        }
    }
}

/// Constructs an `impl` for the given `enum` with a constant for the
/// discriminant of each variant, a `tag()` getter, and a `mnemonic()` getter
/// returning the variant name in lowercase.
///
/// Usage examples:
///
/// * `#[enum_tags(public, repr(u8))]`
/// * `#[enum_tags(private, repr(u32))]`
///
/// Explicit discriminants must be integer literals. Note that the `repr` type
/// can be any numerical type to which a `usize` can be casted with the `as`
/// keyword --- it is not the same as the type for which you may
/// `#[repr(...)]` the `enum`.
#[proc_macro_attribute]
pub fn enum_tags(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = syn::parse_macro_input!(args as EnumTagsArgs);

    let input_item = syn::parse_macro_input!(input as syn::DeriveInput);
    let input_item_cloned = input_item.clone();

    let data_enum = match input_item.data {
        syn::Data::Enum(data_enum) => data_enum,
        syn::Data::Struct(syn::DataStruct {
            struct_token: syn::token::Struct { span },
            ..
        })
        | syn::Data::Union(syn::DataUnion {
            union_token: syn::token::Union { span },
            ..
        }) => {
            return syn::Error::new(span, "Item must be an `enum`")
                .into_compile_error()
                .into();
        }
    };

    let visibility = match args.visibility {
        Visibility::Public(span) => {
            syn::Visibility::Public(syn::token::Pub { span })
        }
        Visibility::Private => syn::Visibility::Inherited,
    };

    let variants = match resolve_tags(data_enum.variants.into_iter()) {
        Ok(variants) => variants,
        Err(error) => return error.into_compile_error().into(),
    };

    let tags_impl = impl_enum_tags(
        visibility,
        input_item.ident,
        args.repr_type,
        &variants,
    );

    quote! {
        #input_item_cloned

        #tags_impl
    }
    .into()
}
