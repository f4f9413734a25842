// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory drink store.
//!
//! Drinks live for the lifetime of the process. Ids start at 1, are never
//! reused, and listing returns drinks in id order.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{CreateDrinkRequest, Drink, RecipePart, UpdateDrinkRequest};

#[derive(Default)]
pub struct InMemoryStore {
    drinks: BTreeMap<u32, Drink>,
    last_id: u32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the sample "water" drink already added.
    pub fn with_sample_drink() -> Self {
        let mut store = Self::new();
        let water = vec![RecipePart {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }];
        if let Err(err) = store.insert("water".to_string(), water) {
            tracing::warn!(error = %err, "Failed to seed sample drink");
        }
        store
    }

    pub fn list_drinks(&self) -> Vec<Drink> {
        self.drinks.values().cloned().collect()
    }

    pub fn create_drink(&mut self, request: CreateDrinkRequest) -> Result<Drink, ApiError> {
        self.insert(request.title, request.recipe.into())
    }

    pub fn update_drink(&mut self, id: u32, request: UpdateDrinkRequest) -> Result<Drink, ApiError> {
        if !self.drinks.contains_key(&id) {
            return Err(ApiError::not_found("Drink not found"));
        }
        if request.title.is_none() && request.recipe.is_none() {
            return Err(ApiError::unprocessable("Nothing to update"));
        }

        if let Some(title) = &request.title {
            self.validate_title(title, Some(id))?;
        }
        let recipe = request.recipe.map(Vec::<RecipePart>::from);
        if let Some(recipe) = &recipe {
            validate_recipe(recipe)?;
        }

        let drink = self
            .drinks
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Drink not found"))?;
        if let Some(title) = request.title {
            drink.title = title.trim().to_string();
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    pub fn delete_drink(&mut self, id: u32) -> Result<(), ApiError> {
        if self.drinks.remove(&id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("Drink not found"))
        }
    }

    fn insert(&mut self, title: String, recipe: Vec<RecipePart>) -> Result<Drink, ApiError> {
        self.validate_title(&title, None)?;
        validate_recipe(&recipe)?;

        self.last_id += 1;
        let drink = Drink {
            id: self.last_id,
            title: title.trim().to_string(),
            recipe,
        };
        self.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    /// Titles are non-empty and unique; `except` skips the drink being updated.
    fn validate_title(&self, title: &str, except: Option<u32>) -> Result<(), ApiError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::unprocessable("Drink title must not be empty"));
        }

        let taken = self
            .drinks
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except);
        if taken {
            return Err(ApiError::unprocessable(format!("A drink named '{title}' already exists")));
        }
        Ok(())
    }
}

fn validate_recipe(recipe: &[RecipePart]) -> Result<(), ApiError> {
    if recipe.is_empty() {
        return Err(ApiError::unprocessable("Recipe must have at least one part"));
    }
    if recipe.iter().any(|part| part.parts == 0) {
        return Err(ApiError::unprocessable("Recipe parts must be at least 1"));
    }
    if recipe.iter().any(|part| part.name.trim().is_empty()) {
        return Err(ApiError::unprocessable("Recipe ingredients must be named"));
    }
    Ok(())
}
