//! User-account demo domain
//!
//! A `User` with `username`, `password` and `email`, each under its own
//! tag, plus two composite views:
//!
//! - `Public` extends `Username` and `EMail`
//! - `Credentials` extends `Username` and `Password`

use std::sync::Arc;

use crate::errors::Result;
use crate::model::Value;
use crate::schema::{ClassId, FieldType, Schema};
use crate::tags::{TagId, TagLattice};

#[derive(Debug, Clone, Copy)]
pub struct UserViews {
    pub username: TagId,
    pub password: TagId,
    pub email: TagId,
    pub public: TagId,
    pub credentials: TagId,
}

#[derive(Debug, Clone)]
pub struct UserDomain {
    pub schema: Arc<Schema>,
    pub lattice: Arc<TagLattice>,
    pub user: ClassId,
    pub views: UserViews,
}

impl UserDomain {
    /// # Errors
    ///
    /// Only fails if the fixed definitions collide, which they do not.
    pub fn new() -> Result<Self> {
        let mut tags = TagLattice::builder();
        let username = tags.define("Username", &[])?;
        let password = tags.define("Password", &[])?;
        let email = tags.define("EMail", &[])?;
        let public = tags.define("Public", &[username, email])?;
        let credentials = tags.define("Credentials", &[username, password])?;

        let mut classes = Schema::builder();
        let user = classes
            .class("User")
            .tagged_field("username", FieldType::Reference, username)
            .tagged_field("password", FieldType::Reference, password)
            .tagged_field("email", FieldType::Reference, email)
            .build()?;

        Ok(Self {
            schema: Arc::new(classes.build()),
            lattice: Arc::new(tags.build()),
            user,
            views: UserViews {
                username,
                password,
                email,
                public,
                credentials,
            },
        })
    }

    /// # Errors
    ///
    /// Propagates schema lookup failures.
    pub fn new_user(&self, username: &str, password: &str, email: &str) -> Result<Value> {
        self.schema
            .object(self.user)
            .with("username", username)
            .with("password", password)
            .with("email", email)
            .build()
    }
}
