use crate::graphql::schema::{request_session, GraphQLContext};
use crate::graphql::types::{Cat, CatInput, CatModifyInput};
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};

/// Root mutation object for GraphQL
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a cat owned by the authenticated user
    async fn create_cat(&self, ctx: &Context<'_>, input: CatInput) -> FieldResult<Cat> {
        let context = ctx.data::<GraphQLContext>()?;
        let session = request_session(ctx);

        let cat = context
            .cats
            .create_cat(&session, input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(cat.into())
    }

    /// Update one of the caller's cats (any cat for admins)
    async fn update_cat(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: CatModifyInput,
    ) -> FieldResult<Cat> {
        let context = ctx.data::<GraphQLContext>()?;
        let session = request_session(ctx);

        let cat = context
            .cats
            .update_cat(&session, &id, input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(cat.into())
    }

    /// Delete one of the caller's cats (any cat for admins)
    async fn delete_cat(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Cat> {
        let context = ctx.data::<GraphQLContext>()?;
        let session = request_session(ctx);

        let cat = context
            .cats
            .delete_cat(&session, &id)
            .await
            .map_err(|e| e.extend())?;
        Ok(cat.into())
    }
}
