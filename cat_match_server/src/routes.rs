//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: extract the caller and the payload, call the engine
//! API, and shape the response. Anything longer belongs in the engine.
//!
//! Handlers are generic over the storage backend so that they can be exercised against mocks. Actix cannot register
//! generic handlers directly, so every route is declared with the [`route!`] macro, which generates a
//! `<Name>Route<B>` service factory for the handler.
use actix_web::{get, web, HttpResponse, Responder};
use cat_match_engine::{
    db_types::{CatId, CatUpdate, MatchId, NewCat, NewMatchRequest},
    CatApi,
    CatManagement,
    MatchFlowApi,
    MatchManagement,
};
use log::*;

use crate::{
    auth::JwtClaims,
    data_objects::{DataResponse, DeletedRecord, JsonResponse, MatchIdParam, RegisteredCat},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Match requests  ----------------------------------------------------
route!(create_match => Post "/cat/match" impl MatchManagement);
/// Proposes a match between one of the caller's cats (`userCatId`) and another owner's cat (`matchCatId`).
///
/// Responds with `201 Created` and the new request, which is always `pending`.
pub async fn create_match<B: MatchManagement>(
    claims: JwtClaims,
    body: web::Json<NewMatchRequest>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST match request from {}", claims.sub);
    let created = api.create_match_request(&claims.identity(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(DataResponse::success(created)))
}

route!(my_matches => Get "/cat/match" impl MatchManagement);
/// Every match request involving one of the caller's cats, issued or received, newest first.
pub async fn my_matches<B: MatchManagement>(
    claims: JwtClaims,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET match requests for {}", claims.sub);
    let requests = api.my_match_requests(&claims.identity()).await?;
    Ok(HttpResponse::Ok().json(DataResponse::success(requests)))
}

route!(approve_match => Post "/cat/match/approve" impl MatchManagement);
/// Approves a match request. Only the owner of the cat that received the request may do this.
///
/// Both cats become matched, and every other pending request involving either cat is removed.
pub async fn approve_match<B: MatchManagement>(
    claims: JwtClaims,
    body: web::Json<MatchIdParam>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let MatchIdParam { match_id } = body.into_inner();
    debug!("💻️ POST approve match request {match_id} by {}", claims.sub);
    let result = api.approve_match_request(&claims.identity(), &match_id).await?;
    trace!("💻️ {} competing requests were removed", result.invalidated.len());
    Ok(HttpResponse::Ok().json(JsonResponse::new(format!("Match request {match_id} approved"))))
}

route!(reject_match => Post "/cat/match/reject" impl MatchManagement);
/// Rejects a match request. Only the owner of the cat that received the request may do this.
pub async fn reject_match<B: MatchManagement>(
    claims: JwtClaims,
    body: web::Json<MatchIdParam>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let MatchIdParam { match_id } = body.into_inner();
    debug!("💻️ POST reject match request {match_id} by {}", claims.sub);
    api.reject_match_request(&claims.identity(), &match_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new(format!("Match request {match_id} rejected"))))
}

route!(withdraw_match => Delete "/cat/match/{id}" impl MatchManagement);
/// Withdraws a pending match request that the caller issued.
pub async fn withdraw_match<B: MatchManagement>(
    claims: JwtClaims,
    path: web::Path<MatchId>,
    api: web::Data<MatchFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE match request {id} by {}", claims.sub);
    let withdrawn = api.withdraw_match_request(&claims.identity(), &id).await?;
    Ok(HttpResponse::Ok().json(DataResponse::success(DeletedRecord { id: withdrawn.id })))
}

//----------------------------------------------   Cats  ----------------------------------------------------
route!(register_cat => Post "/cat" impl CatManagement);
pub async fn register_cat<B: CatManagement>(
    claims: JwtClaims,
    body: web::Json<NewCat>,
    api: web::Data<CatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new cat for {}", claims.sub);
    let cat = api.register_cat(&claims.identity(), body.into_inner()).await?;
    let data = RegisteredCat { id: cat.id, created_at: cat.created_at };
    Ok(HttpResponse::Created().json(DataResponse::success(data)))
}

route!(my_cats => Get "/cat/mine" impl CatManagement);
pub async fn my_cats<B: CatManagement>(
    claims: JwtClaims,
    api: web::Data<CatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET cats for {}", claims.sub);
    let cats = api.my_cats(&claims.identity()).await?;
    Ok(HttpResponse::Ok().json(DataResponse::success(cats)))
}

route!(update_cat => Put "/cat/{id}" impl CatManagement);
pub async fn update_cat<B: CatManagement>(
    claims: JwtClaims,
    path: web::Path<CatId>,
    body: web::Json<CatUpdate>,
    api: web::Data<CatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PUT cat {id} by {}", claims.sub);
    let cat = api.update_cat(&claims.identity(), &id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DataResponse::success(cat)))
}

route!(delete_cat => Delete "/cat/{id}" impl CatManagement);
pub async fn delete_cat<B: CatManagement>(
    claims: JwtClaims,
    path: web::Path<CatId>,
    api: web::Data<CatApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE cat {id} by {}", claims.sub);
    let cat = api.delete_cat(&claims.identity(), &id).await?;
    Ok(HttpResponse::Ok().json(DataResponse::success(DeletedRecord { id: cat.id })))
}
