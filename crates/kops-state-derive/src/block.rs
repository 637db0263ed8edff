use darling::{FromDeriveInput, FromField, FromMeta, FromVariant, ast::Data};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{
    Attribute, DeriveInput, Expr, ExprLit, Generics, Lit, Meta, Path, Type, ext::IdentExt,
    parse_quote,
};

#[derive(FromMeta)]
struct PathOverrides {
    #[darling(default = "PathOverrides::default_state")]
    state: Path,
    #[darling(default = "PathOverrides::default_result")]
    result: Path,
}
impl std::default::Default for PathOverrides {
    fn default() -> Self {
        Self {
            state: Self::default_state(),
            result: Self::default_result(),
        }
    }
}
impl PathOverrides {
    fn default_state() -> Path {
        parse_quote!(::kops_state::resource)
    }

    fn default_result() -> Path {
        parse_quote!(::core::result)
    }
}

#[derive(FromDeriveInput)]
#[darling(attributes(state), forward_attrs(doc))]
pub struct BlockInput {
    ident: Ident,
    generics: Generics,
    data: Data<BlockVariant, BlockField>,
    attrs: Vec<Attribute>,
    #[darling(default)]
    path_overrides: PathOverrides,
    #[darling(default)]
    default: bool,
}

#[derive(FromVariant)]
struct BlockVariant {}

#[derive(FromField)]
#[darling(attributes(state), forward_attrs(doc))]
struct BlockField {
    ident: Option<Ident>,
    ty: Type,
    attrs: Vec<Attribute>,
    #[darling(default)]
    rename: Option<String>,
    #[darling(default)]
    default: bool,
    #[darling(default)]
    computed: bool,
    #[darling(default)]
    skip: bool,
}

impl BlockField {
    /// The key of the field in the state map.
    fn key(&self, ident: &Ident) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| ident.unraw().to_string())
    }
}

/// Joins all `#[doc]` lines into a single description.
fn description(attrs: &[Attribute]) -> TokenStream {
    let lines = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(line),
                    ..
                }) => Some(line.value().trim().to_owned()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    if lines.is_empty() {
        quote! { ::core::option::Option::None }
    } else {
        let description = lines.join(" ");
        quote! { ::core::option::Option::Some(#description) }
    }
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let BlockInput {
        ident,
        data,
        attrs,
        generics,
        default: container_default,
        path_overrides:
            PathOverrides {
                state: state_mod,
                result: result_mod,
            },
    } = match BlockInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };
    let fields = match data {
        Data::Enum(_) => {
            return quote! {
                compile_error!("`#[derive(Block)]` does not currently support enums, implement `Block` by hand");
            };
        }
        Data::Struct(fields) => fields.fields,
    };

    let mut resource_fields = TokenStream::new();
    let mut flatten_fields = TokenStream::new();
    let mut expand_fields = TokenStream::new();

    for field in &fields {
        let Some(field_ident) = &field.ident else {
            return quote! {
                compile_error!("`#[derive(Block)]` only supports structs with named fields");
            };
        };

        if field.skip {
            expand_fields.extend(quote! {
                #field_ident: ::core::default::Default::default(),
            });
            continue;
        }

        let key = field.key(field_ident);
        let ty = &field.ty;
        let defaulted = container_default || field.default;
        let computed = field.computed;
        let field_description = description(&field.attrs);

        resource_fields.extend(quote! {
            .field(
                #key,
                #state_mod::field_schema::<#ty>(#defaulted, #computed, #field_description),
            )
        });

        flatten_fields.extend(quote! {
            #state_mod::flatten_field(&mut map, #key, &self.#field_ident);
        });

        let expand_fn = if defaulted {
            quote! { #state_mod::expand_field_or_default }
        } else {
            quote! { #state_mod::expand_field }
        };
        expand_fields.extend(quote! {
            #field_ident: #expand_fn(map, #key, &validator)?,
        });
    }

    let block_description = description(&attrs);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics #state_mod::Block for #ident #ty_generics #where_clause {
            fn resource() -> #state_mod::ResourceSchema {
                #state_mod::ResourceSchema::new()
                    #resource_fields
                    .describe(#block_description)
            }

            fn flatten_block(&self) -> #state_mod::StateMap {
                let mut map = #state_mod::StateMap::new();
                #flatten_fields
                map
            }

            fn expand_block(
                map: &#state_mod::StateMap,
                validator: #state_mod::Validator,
            ) -> #result_mod::Result<Self, #state_mod::StateError> {
                #result_mod::Result::Ok(Self {
                    #expand_fields
                })
            }
        }

        impl #impl_generics #state_mod::Attribute for #ident #ty_generics #where_clause {
            fn schema() -> #state_mod::Schema {
                #state_mod::block_schema::<Self>()
            }

            fn elem() -> #state_mod::Elem {
                #state_mod::Elem::Resource(<Self as #state_mod::Block>::resource())
            }

            fn is_absent(value: &#state_mod::Value) -> bool {
                #state_mod::is_absent_block(value)
            }

            fn flatten(&self) -> ::core::option::Option<#state_mod::Value> {
                ::core::option::Option::Some(#state_mod::flatten_singleton(self))
            }

            fn flatten_elem(&self) -> #state_mod::Value {
                #state_mod::Value::Object(#state_mod::Block::flatten_block(self))
            }

            fn expand(
                value: &#state_mod::Value,
                validator: #state_mod::Validator,
            ) -> #result_mod::Result<Self, #state_mod::StateError> {
                #state_mod::expand_singleton(value, validator)
            }

            fn expand_elem(
                value: &#state_mod::Value,
                validator: #state_mod::Validator,
            ) -> #result_mod::Result<Self, #state_mod::StateError> {
                #state_mod::expand_object(value, validator)
            }
        }
    }
}
