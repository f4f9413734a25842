// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the drink API. All types derive
//! `Serialize`/`Deserialize` as needed and `ToSchema` for the OpenAPI
//! document.
//!
//! ## Representations
//!
//! A drink is exposed in two forms:
//!
//! - **short** ([`DrinkShort`]): recipe colors and proportions only, for the
//!   menu board
//! - **long** ([`Drink`]): the full recipe including ingredient names, for
//!   baristas and managers

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Drink Models
// =============================================================================

/// One ingredient of a drink recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecipePart {
    /// Ingredient name.
    pub name: String,
    /// Display color (any CSS color).
    pub color: String,
    /// Relative proportion in the cup.
    pub parts: u32,
}

/// Recipe part without the ingredient name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecipePartShort {
    pub color: String,
    pub parts: u32,
}

/// A drink with its full recipe (long form).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Drink {
    /// Unique identifier.
    pub id: u32,
    /// Unique drink name.
    pub title: String,
    /// Ingredients, top of the cup last.
    pub recipe: Vec<RecipePart>,
}

/// A drink as shown to customers (short form).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkShort {
    pub id: u32,
    pub title: String,
    pub recipe: Vec<RecipePartShort>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|part| RecipePartShort {
                    color: part.color.clone(),
                    parts: part.parts,
                })
                .collect(),
        }
    }
}

/// A recipe as submitted: one part or a list of parts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<RecipePart>),
    One(RecipePart),
}

impl From<RecipeInput> for Vec<RecipePart> {
    fn from(value: RecipeInput) -> Self {
        match value {
            RecipeInput::Many(parts) => parts,
            RecipeInput::One(part) => vec![part],
        }
    }
}

/// Request body for creating a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

/// Request body for updating a drink. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// `{"success": true, "drinks": [...]}` with short-form drinks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinksShortResponse {
    pub success: bool,
    pub drinks: Vec<DrinkShort>,
}

/// `{"success": true, "drinks": [...]}` with long-form drinks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinksResponse {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

/// `{"success": true, "delete": id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    /// Identifier of the removed drink.
    pub delete: u32,
}
