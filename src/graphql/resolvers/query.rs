use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{Cat, LocationInput};
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};

/// Root query object for GraphQL
pub struct Query;

fn to_graphql(cats: Vec<crate::domain::Cat>) -> Vec<Cat> {
    cats.into_iter().map(Cat::from).collect()
}

#[Object]
impl Query {
    /// Get all cats
    async fn cats(&self, ctx: &Context<'_>) -> FieldResult<Vec<Cat>> {
        let context = ctx.data::<GraphQLContext>()?;
        let cats = context.cats.cats().await.map_err(|e| e.extend())?;
        Ok(to_graphql(cats))
    }

    /// Get a cat by ID
    async fn cat_by_id(&self, ctx: &Context<'_>, id: ID) -> FieldResult<Cat> {
        let context = ctx.data::<GraphQLContext>()?;
        let cat = context.cats.cat_by_id(&id).await.map_err(|e| e.extend())?;
        Ok(cat.into())
    }

    /// Get the cats of one owner
    async fn cats_by_owner(&self, ctx: &Context<'_>, owner_id: ID) -> FieldResult<Vec<Cat>> {
        let context = ctx.data::<GraphQLContext>()?;
        let cats = context
            .cats
            .cats_by_owner(&owner_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(to_graphql(cats))
    }

    /// Get the cats inside a rectangle given by its north-east and
    /// south-west corners
    async fn cats_by_area(
        &self,
        ctx: &Context<'_>,
        top_right: LocationInput,
        bottom_left: LocationInput,
    ) -> FieldResult<Vec<Cat>> {
        let context = ctx.data::<GraphQLContext>()?;
        let cats = context
            .cats
            .cats_by_area(top_right.into(), bottom_left.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(to_graphql(cats))
    }
}
