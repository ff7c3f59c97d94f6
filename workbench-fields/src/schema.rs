//! Registry of entity definitions for one app.
//!
//! Each app builds its schema in code with `SchemaBuilder`. Operators can
//! replace individual entity definitions by dropping `<entity>.yaml` files in
//! an override directory, which is read by `Schema::apply_overrides`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{FieldsError, Result};
use crate::types::{EntityDef, FieldType};

/// Builder for `Schema`. Created by `Schema::builder()`.
pub struct SchemaBuilder {
    app: String,
    entities: Vec<EntityDef>,
}

impl SchemaBuilder {
    /// Add an entity definition.
    pub fn entity(mut self, def: EntityDef) -> Self {
        self.entities.push(def);
        self
    }

    /// Build the schema, rejecting duplicate entity or field names.
    pub fn build(self) -> Result<Schema> {
        let mut schema = Schema {
            app: self.app,
            entities: Vec::new(),
            index: HashMap::new(),
        };
        for def in self.entities {
            if schema.index.contains_key(&def.name) {
                return Err(FieldsError::DuplicateEntity { name: def.name });
            }
            check_fields(&def)?;
            schema.insert(def);
        }
        debug!(app = %schema.app, entities = schema.entities.len(), "schema built");
        Ok(schema)
    }
}

/// On-disk shape of a whole schema.
#[derive(Debug, Serialize, Deserialize)]
struct SchemaFile {
    app: String,
    #[serde(default)]
    entities: Vec<EntityDef>,
}

/// Entity definitions for one app, indexed by name.
#[derive(Debug, Clone)]
pub struct Schema {
    app: String,
    entities: Vec<EntityDef>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Start building a schema for the named app.
    ///
    /// ```rust,ignore
    /// let schema = Schema::builder("clinic")
    ///     .entity(EntityDef::new("doctor", "doctors"))
    ///     .build()?;
    /// ```
    pub fn builder(app: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            app: app.into(),
            entities: Vec::new(),
        }
    }

    /// Parse a whole schema from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: SchemaFile = serde_yaml_ng::from_str(yaml)?;
        file.entities
            .into_iter()
            .fold(Schema::builder(file.app), SchemaBuilder::entity)
            .build()
    }

    /// Serialize the whole schema to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        let file = SchemaFile {
            app: self.app.clone(),
            entities: self.entities.clone(),
        };
        Ok(serde_yaml_ng::to_string(&file)?)
    }

    /// App name this schema belongs to.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Get an entity definition by name.
    pub fn get(&self, name: &str) -> Option<&EntityDef> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    /// Get an entity definition by name, or `EntityNotFound`.
    pub fn require(&self, name: &str) -> Result<&EntityDef> {
        self.get(name).ok_or_else(|| FieldsError::EntityNotFound {
            name: name.to_string(),
        })
    }

    /// All entity definitions in declaration order.
    pub fn entities(&self) -> &[EntityDef] {
        &self.entities
    }

    /// Replace or add entity definitions from `<dir>/*.yaml`.
    ///
    /// A replacement must keep the collection, keep every required field
    /// required, and keep the storage type of every field it retains.
    /// Invalid or incompatible files are skipped with a warning. Returns the
    /// number of definitions applied.
    pub async fn apply_overrides(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(FieldsError::NotFound {
                path: dir.to_path_buf(),
            });
        }
        let mut applied = 0;
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            let def = match serde_yaml_ng::from_str::<EntityDef>(&content) {
                Ok(def) => def,
                Err(e) => {
                    warn!(?path, %e, "skipping invalid entity definition");
                    continue;
                }
            };
            let checked = check_fields(&def).and_then(|()| match self.get(&def.name) {
                Some(base) => check_compatible(base, &def),
                None => Ok(()),
            });
            if let Err(e) = checked {
                warn!(?path, %e, "skipping invalid entity definition");
                continue;
            }
            debug!(app = %self.app, entity = %def.name, "applied schema override");
            self.insert(def);
            applied += 1;
        }
        Ok(applied)
    }

    fn insert(&mut self, def: EntityDef) {
        if let Some(&idx) = self.index.get(&def.name) {
            self.entities[idx] = def;
        } else {
            let idx = self.entities.len();
            self.index.insert(def.name.clone(), idx);
            self.entities.push(def);
        }
    }
}

fn check_fields(def: &EntityDef) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for field in &def.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(FieldsError::DuplicateField {
                entity: def.name.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Records written under `base` must still decode under `def`.
fn check_compatible(base: &EntityDef, def: &EntityDef) -> Result<()> {
    let incompatible = |reason: String| FieldsError::IncompatibleOverride {
        entity: def.name.clone(),
        reason,
    };
    if def.collection != base.collection {
        return Err(incompatible(format!(
            "collection '{}' differs from '{}'",
            def.collection, base.collection
        )));
    }
    for base_field in &base.fields {
        let Some(field) = def.get_field(&base_field.name) else {
            if base_field.required {
                return Err(incompatible(format!(
                    "required field '{}' is missing",
                    base_field.name
                )));
            }
            continue;
        };
        if base_field.required && !field.required {
            return Err(incompatible(format!(
                "field '{}' must stay required",
                field.name
            )));
        }
        if !same_storage(&base_field.type_, &field.type_) {
            return Err(incompatible(format!(
                "field '{}' changes type from {} to {}",
                field.name,
                base_field.type_.kind(),
                field.type_.kind()
            )));
        }
    }
    Ok(())
}

fn same_storage(base: &FieldType, other: &FieldType) -> bool {
    match (base, other) {
        (
            FieldType::Number { integer: a, .. },
            FieldType::Number { integer: b, .. },
        ) => a == b,
        (FieldType::Select { options: a }, FieldType::Select { options: b }) => {
            b.iter().all(|o| a.iter().any(|base| base.value == o.value))
        }
        (FieldType::Reference { entity: a }, FieldType::Reference { entity: b }) => a == b,
        _ => base.kind() == other.kind(),
    }
}
