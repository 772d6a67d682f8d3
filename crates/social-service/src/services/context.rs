//! Service context - dependency container for services
//!
//! Holds the entity services and the id generator they share.

use std::sync::Arc;

use social_core::{
    DomainError, IdGenerator, Lifecycle, Producer, Reaction, ReactionService, ServiceResult, User,
    UserService,
};

use crate::middleware::{chain, reaction_logging, user_logging, Middleware};

use super::mem::MemService;

/// Service context containing all entity services
///
/// Services are stored behind their trait objects, already wrapped in the
/// configured middleware.
#[derive(Clone)]
pub struct ServiceContext {
    reactions: Arc<dyn ReactionService>,
    users: Arc<dyn UserService>,
    id_generator: Arc<dyn IdGenerator>,
}

impl ServiceContext {
    /// Create a context from already built services
    pub fn new(
        reactions: Arc<dyn ReactionService>,
        users: Arc<dyn UserService>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            reactions,
            users,
            id_generator,
        }
    }

    /// Get the reaction service
    pub fn reactions(&self) -> Arc<dyn ReactionService> {
        Arc::clone(&self.reactions)
    }

    /// Get the user service
    pub fn users(&self) -> Arc<dyn UserService> {
        Arc::clone(&self.users)
    }

    /// Get the id generator
    pub fn id_generator(&self) -> &dyn IdGenerator {
        self.id_generator.as_ref()
    }

    /// Set up a namespace in every service
    pub async fn setup(&self, namespace: &str) -> ServiceResult<()> {
        self.reactions.setup(namespace).await?;
        self.users.setup(namespace).await
    }

    /// Tear down a namespace in every service
    pub async fn teardown(&self, namespace: &str) -> ServiceResult<()> {
        self.reactions.teardown(namespace).await?;
        self.users.teardown(namespace).await
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("reactions", &"dyn ReactionService")
            .field("users", &"dyn UserService")
            .field("id_generator", &"dyn IdGenerator")
            .finish()
    }
}

/// Builder for a ServiceContext backed by in-memory services
pub struct ServiceContextBuilder {
    id_generator: Option<Arc<dyn IdGenerator>>,
    reaction_source: Option<Arc<dyn Producer<Reaction>>>,
    user_source: Option<Arc<dyn Producer<User>>>,
    reaction_middlewares: Vec<Middleware<dyn ReactionService>>,
    user_middlewares: Vec<Middleware<dyn UserService>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            id_generator: None,
            reaction_source: None,
            user_source: None,
            reaction_middlewares: Vec::new(),
            user_middlewares: Vec::new(),
        }
    }

    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }

    pub fn reaction_source(mut self, source: Arc<dyn Producer<Reaction>>) -> Self {
        self.reaction_source = Some(source);
        self
    }

    pub fn user_source(mut self, source: Arc<dyn Producer<User>>) -> Self {
        self.user_source = Some(source);
        self
    }

    /// Add a reaction service middleware. Later middlewares wrap earlier ones.
    pub fn reaction_middleware(mut self, middleware: Middleware<dyn ReactionService>) -> Self {
        self.reaction_middlewares.push(middleware);
        self
    }

    /// Add a user service middleware. Later middlewares wrap earlier ones.
    pub fn user_middleware(mut self, middleware: Middleware<dyn UserService>) -> Self {
        self.user_middlewares.push(middleware);
        self
    }

    /// Log every service call
    pub fn with_logging(self) -> Self {
        self.reaction_middleware(reaction_logging())
            .user_middleware(user_logging())
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `DomainError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let id_generator = self.id_generator.ok_or_else(|| missing("id_generator"))?;
        let reaction_source = self.reaction_source.ok_or_else(|| missing("reaction_source"))?;
        let user_source = self.user_source.ok_or_else(|| missing("user_source"))?;

        let reactions: Arc<dyn ReactionService> =
            Arc::new(MemService::new(Arc::clone(&id_generator), reaction_source));
        let users: Arc<dyn UserService> =
            Arc::new(MemService::new(Arc::clone(&id_generator), user_source));

        Ok(ServiceContext::new(
            chain(reactions, self.reaction_middlewares),
            chain(users, self.user_middlewares),
            id_generator,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(dependency: &str) -> DomainError {
    DomainError::Internal(format!("{dependency} is required"))
}
