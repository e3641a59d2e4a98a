//! The storage module keeps a recipe book of extracted recipes in SQLite.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Arc, Mutex};

use crate::recipe::Recipe;

/// Storage provides database operations for saving and retrieving recipes.
pub struct Storage {
    /// The underlying SQLite connection wrapped in Arc<Mutex<>> to make it thread-safe
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    /// Creates a new Storage instance with a database at the specified path.
    ///
    /// # Arguments
    ///
    /// * `database_path` - Path where the database file should be created or opened
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or its schema created
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .with_context(|| format!("Unable to open recipe book {database_path}"))?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initializes the database schema with the recipes table if it doesn't exist.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS recipes (
                source_url TEXT PRIMARY KEY,
                saved_at INTEGER NOT NULL,
                title TEXT NOT NULL,
                servings TEXT NOT NULL,
                prep_time TEXT NOT NULL,
                cook_time TEXT NOT NULL,
                ingredients TEXT NOT NULL,
                instructions TEXT NOT NULL,
                comments_summary TEXT NOT NULL
            )",
            params![],
        )?;

        Ok(())
    }

    /// Adds or replaces a recipe, keyed by its source URL.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn upsert_recipe(&self, recipe: &Recipe, saved_at: DateTime<Utc>) -> Result<()> {
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let instructions = serde_json::to_string(&recipe.instructions)?;

        let conn = self.conn.lock().expect("Storage mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO recipes (source_url, saved_at, title, servings, prep_time, cook_time, ingredients, instructions, comments_summary) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                recipe.source_url,
                saved_at.timestamp(),
                recipe.title,
                recipe.servings,
                recipe.prep_time,
                recipe.cook_time,
                ingredients,
                instructions,
                recipe.comments_summary,
            ],
        )?;

        Ok(())
    }

    /// Gets a saved recipe by its source URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a stored list is corrupt
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn get_recipe(&self, source_url: &str) -> Result<Option<StoredRecipe>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT source_url, saved_at, title, servings, prep_time, cook_time, ingredients, instructions, comments_summary FROM recipes WHERE source_url = ?1",
        )?;
        let row: Option<RecipeRow> = stmt
            .query_row([source_url], RecipeRow::from_row)
            .optional()
            .map_err(|e| anyhow::anyhow!("Unable to fetch recipe row: {e}"))?;

        row.map(StoredRecipe::try_from).transpose()
    }

    /// Lists saved recipes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn list_recipes(&self) -> Result<Vec<RecipeSummary>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT source_url, saved_at, title, servings, prep_time, cook_time, ingredients, instructions, comments_summary FROM recipes ORDER BY saved_at DESC, source_url ASC",
        )?;
        let rows: Result<Vec<RecipeRow>, rusqlite::Error> =
            stmt.query_map([], RecipeRow::from_row)?.collect();

        rows?
            .into_iter()
            .map(|row| StoredRecipe::try_from(row).map(|stored| RecipeSummary::from(&stored)))
            .collect()
    }

    /// Returns all saved source URLs, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn list_urls(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let mut stmt =
            conn.prepare("SELECT source_url FROM recipes ORDER BY saved_at DESC, source_url ASC")?;
        let urls: Result<Vec<String>, rusqlite::Error> =
            stmt.query_map([], |row| row.get(0))?.collect();

        urls.map_err(|e| e.into())
    }

    /// Removes a recipe. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned
    pub fn delete_recipe(&self, source_url: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("Storage mutex poisoned");
        let removed = conn.execute(
            "DELETE FROM recipes WHERE source_url = ?1",
            params![source_url],
        )?;
        Ok(removed > 0)
    }
}

/// Represents a recipe stored in the database
#[derive(Debug)]
pub struct RecipeRow {
    pub source_url: String,
    pub saved_at: i64,
    pub title: String,
    pub servings: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: String,
    pub instructions: String,
    pub comments_summary: String,
}

impl RecipeRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            source_url: row.get(0)?,
            saved_at: row.get(1)?,
            title: row.get(2)?,
            servings: row.get(3)?,
            prep_time: row.get(4)?,
            cook_time: row.get(5)?,
            ingredients: row.get(6)?,
            instructions: row.get(7)?,
            comments_summary: row.get(8)?,
        })
    }
}

/// A recipe from the recipe book along with when it was saved.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StoredRecipe {
    pub recipe: Recipe,
    pub saved_at: DateTime<Utc>,
}

impl TryFrom<RecipeRow> for StoredRecipe {
    type Error = anyhow::Error;

    fn try_from(row: RecipeRow) -> Result<Self> {
        Ok(StoredRecipe {
            saved_at: DateTime::from_timestamp(row.saved_at, 0)
                .context("Unable to initialize saved_at from database")?,
            recipe: Recipe {
                ingredients: serde_json::from_str(&row.ingredients)
                    .with_context(|| format!("Corrupt ingredients for {}", row.source_url))?,
                instructions: serde_json::from_str(&row.instructions)
                    .with_context(|| format!("Corrupt instructions for {}", row.source_url))?,
                title: row.title,
                servings: row.servings,
                prep_time: row.prep_time,
                cook_time: row.cook_time,
                source_url: row.source_url,
                comments_summary: row.comments_summary,
            },
        })
    }
}

/// One line of the recipe book listing.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RecipeSummary {
    pub source_url: String,
    pub title: String,
    pub ingredient_count: usize,
    pub step_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl From<&StoredRecipe> for RecipeSummary {
    fn from(stored: &StoredRecipe) -> Self {
        Self {
            source_url: stored.recipe.source_url.clone(),
            title: stored.recipe.title.clone(),
            ingredient_count: stored.recipe.ingredients.len(),
            step_count: stored.recipe.instructions.len(),
            saved_at: stored.saved_at,
        }
    }
}
