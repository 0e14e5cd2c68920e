use crate::app::CatResolver;
use crate::auth::Session;
use crate::graphql::resolvers::{Mutation, Query};
use async_graphql::{Context, EmptySubscription, Schema};

/// GraphQL context containing shared application state
pub struct GraphQLContext {
    pub cats: CatResolver,
}

/// The complete GraphQL schema
pub type GraphQLSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create a new GraphQL schema around the given resolver
pub fn create_schema(cats: CatResolver) -> GraphQLSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(GraphQLContext { cats })
        .finish()
}

/// Session attached to the current request; anonymous when none was set
pub(crate) fn request_session(ctx: &Context<'_>) -> Session {
    ctx.data_opt::<Session>().cloned().unwrap_or_default()
}
