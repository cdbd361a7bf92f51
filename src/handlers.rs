use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, LoginRequired, MaybeUser,
    },
    data_formats::*,
    db_helpers::{
        add_comment_to_post_in_db, count_posts_in_db, follow_author_in_db, get_author_or_404,
        get_comments_for_post_in_db, get_feed_page_in_db, get_group_by_id_in_db,
        get_group_by_slug_in_db, get_post_by_id_in_db, get_user_by_id, get_user_by_username,
        insert_post_in_db, insert_user, is_following_in_db, list_groups_in_db,
        unfollow_author_in_db, update_post_in_db, PostFilter,
    },
    errors::RequestError,
    models::User,
    pagination::parse_page_number,
    AppContext,
};

type Context = Extension<Arc<AppContext>>;
type JsonResult<T> = Result<Json<T>, RequestError>;
type Params = Query<HashMap<String, String>>;

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// The `page` query value; a repeated key keeps its last value.
fn requested_page(params: &HashMap<String, String>) -> i64 {
    parse_page_number(params.get("page").map(String::as_str))
}

/// Post ids that are not integers name no post at all.
fn parse_post_id(raw: &str) -> Result<i64, RequestError> {
    raw.parse().map_err(|_| RequestError::NotFound)
}

async fn current_user(context: &AppContext, id: i64) -> Result<User, RequestError> {
    match get_user_by_id(&context.pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotAuthorized("User no longer exists")),
    }
}

/// Checks the text and group of a submitted post form.
async fn clean_post_form(
    context: &AppContext,
    PostRequest { text, group, image }: PostRequest,
) -> Result<PostRequest, RequestError> {
    if text.trim().is_empty() {
        return Err(RequestError::RunTimeError("Text must not be empty"));
    }
    if let Some(group_id) = group {
        if get_group_by_id_in_db(&context.pool, group_id).await?.is_none() {
            return Err(RequestError::RunTimeError("Select a valid group"));
        }
    }
    Ok(PostRequest { text, group, image })
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- Feed Handlers -----------------
pub async fn index(
    Extension(context): Context,
    Query(params): Params,
) -> Result<Response, RequestError> {
    let requested = requested_page(&params).max(1);
    let key = format!("page={}", requested);
    let body = match context.index_cache.get(&key) {
        Some(body) => body,
        None => {
            let page = get_feed_page_in_db(
                &context.pool,
                PostFilter::all(),
                context.paginator(),
                requested,
            )
            .await?;
            let page_obj = page.map(PostResponse::new);
            let body = serde_json::to_string(&IndexContext { page_obj }).map_err(|e| {
                tracing::error!(error = %e, "failed to render index page");
                RequestError::ServerError
            })?;
            context.index_cache.insert(key, body.clone());
            body
        }
    };
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn group_posts(
    Extension(context): Context,
    Path(slug): Path<String>,
    Query(params): Params,
) -> JsonResult<GroupContext> {
    let group = get_group_by_slug_in_db(&context.pool, &slug).await?;
    let page = get_feed_page_in_db(
        &context.pool,
        PostFilter::group(group.id),
        context.paginator(),
        requested_page(&params),
    )
    .await?;
    Ok(Json(GroupContext {
        group: GroupResponse::new(group),
        page_obj: page.map(PostResponse::new),
    }))
}

pub async fn profile(
    Extension(context): Context,
    maybe_user: MaybeUser,
    Path(username): Path<String>,
    Query(params): Params,
) -> JsonResult<ProfileContext> {
    let author = get_author_or_404(&context.pool, &username).await?;
    let following = is_following_in_db(&context.pool, maybe_user.get_id(), author.id).await?;
    let page = get_feed_page_in_db(
        &context.pool,
        PostFilter::author(author.id),
        context.paginator(),
        requested_page(&params),
    )
    .await?;
    Ok(Json(ProfileContext {
        author: AuthorResponse::new(&author),
        following,
        page_obj: page.map(PostResponse::new),
    }))
}

pub async fn follow_index(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Query(params): Params,
) -> JsonResult<FollowContext> {
    let page = get_feed_page_in_db(
        &context.pool,
        PostFilter::followed_by(user.id),
        context.paginator(),
        requested_page(&params),
    )
    .await?;
    Ok(Json(FollowContext {
        page_obj: page.map(PostResponse::new),
    }))
}

// ----------------- Post Handlers -----------------
pub async fn post_detail(
    Extension(context): Context,
    Path(post_id): Path<String>,
) -> JsonResult<PostDetailContext> {
    let post = get_post_by_id_in_db(&context.pool, parse_post_id(&post_id)?).await?;
    let author_posts_count =
        count_posts_in_db(&context.pool, PostFilter::author(post.author_id)).await?;
    let comments = get_comments_for_post_in_db(&context.pool, post.id)
        .await?
        .into_iter()
        .map(CommentResponse::new)
        .collect();
    Ok(Json(PostDetailContext {
        post: PostResponse::new(post),
        author_posts_count,
        comments,
        form: FormResponse::comment_form(),
    }))
}

pub async fn post_create_form(
    Extension(context): Context,
    LoginRequired(_): LoginRequired,
) -> JsonResult<PostFormContext> {
    let groups = list_groups_in_db(&context.pool).await?;
    Ok(Json(PostFormContext {
        form: FormResponse::post_form(groups, None),
        is_edit: false,
        post_id: None,
    }))
}

pub async fn post_create(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Json(request): Json<PostRequest>,
) -> Result<Redirect, RequestError> {
    let author = current_user(&context, user.id).await?;
    let PostRequest { text, group, image } = clean_post_form(&context, request).await?;
    let image = image.filter(|image| !image.trim().is_empty());
    let post_id = insert_post_in_db(&context.pool, author.id, &text, group, image.as_deref()).await?;
    tracing::info!(post_id, author = %author, "post created");
    Ok(Redirect::to(&profile_url(&author.username)))
}

pub async fn post_edit_form(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<String>,
) -> Result<Response, RequestError> {
    let post = get_post_by_id_in_db(&context.pool, parse_post_id(&post_id)?).await?;
    if post.author_id != user.id {
        return Ok(Redirect::to(&post_detail_url(post.id)).into_response());
    }
    let groups = list_groups_in_db(&context.pool).await?;
    Ok(Json(PostFormContext {
        form: FormResponse::post_form(groups, Some(&post)),
        is_edit: true,
        post_id: Some(post.id),
    })
    .into_response())
}

pub async fn post_edit(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<String>,
    Json(request): Json<PostRequest>,
) -> Result<Redirect, RequestError> {
    let post = get_post_by_id_in_db(&context.pool, parse_post_id(&post_id)?).await?;
    let detail = Redirect::to(&post_detail_url(post.id));
    if post.author_id != user.id {
        tracing::warn!(post_id = post.id, user_id = user.id, "edit attempt by non-author");
        return Ok(detail);
    }
    let PostRequest { text, group, image } = clean_post_form(&context, request).await?;
    // No image in the form keeps the stored one; a blank one clears it.
    let image = match image {
        Some(image) if image.trim().is_empty() => None,
        Some(image) => Some(image),
        None => post.image.clone(),
    };
    update_post_in_db(
        &context.pool,
        post.id,
        user.id,
        &text,
        group,
        image.as_deref(),
    )
    .await?;
    Ok(detail)
}

// ----------------- Comment Handlers -----------------
pub async fn add_comment(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<String>,
    Json(CommentRequest { text }): Json<CommentRequest>,
) -> Result<Redirect, RequestError> {
    let post = get_post_by_id_in_db(&context.pool, parse_post_id(&post_id)?).await?;
    if text.trim().is_empty() {
        tracing::debug!(post_id = post.id, "blank comment ignored");
    } else {
        add_comment_to_post_in_db(&context.pool, user.id, post.id, &text).await?;
    }
    Ok(Redirect::to(&post_detail_url(post.id)))
}

// ----------------- Follow Handlers -----------------
pub async fn profile_follow(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Path(username): Path<String>,
) -> Result<Redirect, RequestError> {
    let author = get_author_or_404(&context.pool, &username).await?;
    if author.id != user.id {
        let (_, created) = follow_author_in_db(&context.pool, user.id, author.id).await?;
        tracing::debug!(user_id = user.id, author_id = author.id, created, "follow");
    }
    Ok(Redirect::to(&profile_url(&author.username)))
}

pub async fn profile_unfollow(
    Extension(context): Context,
    LoginRequired(user): LoginRequired,
    Path(username): Path<String>,
) -> Result<Redirect, RequestError> {
    let author = get_author_or_404(&context.pool, &username).await?;
    let removed = unfollow_author_in_db(&context.pool, user.id, author.id).await?;
    tracing::debug!(user_id = user.id, author_id = author.id, removed, "unfollow");
    Ok(Redirect::to(&profile_url(&author.username)))
}

// ----------------- User Handlers -----------------
pub async fn signup(
    Extension(context): Context,
    Json(SignupRequest { username, password }): Json<SignupRequest>,
) -> JsonResult<UserWrapper<UserResponse>> {
    let username = username.trim().to_owned();
    if username.is_empty() || password.is_empty() {
        return Err(RequestError::RunTimeError(
            "Username and password are required",
        ));
    }
    let password = hash_password_argon2(password).await.map_err(|e| {
        tracing::error!(error = %e, "failed to hash password");
        RequestError::ServerError
    })?;

    let user = insert_user(&context.pool, &username, &password)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                return RequestError::RunTimeError("Username already taken");
            }
            e
        })?;

    let token = get_jwt_token(&context.config.jwt_secret, user.id).map_err(|e| {
        tracing::error!(error = %e, "failed to issue token");
        RequestError::ServerError
    })?;
    tracing::info!(user = %user, "user signed up");
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn login_form(Query(params): Params) -> Json<LoginFormContext> {
    Json(LoginFormContext {
        form: FormResponse::login_form(),
        next: params.get("next").cloned(),
    })
}

pub async fn login(
    Extension(context): Context,
    Json(LoginRequest { username, password }): Json<LoginRequest>,
) -> JsonResult<UserWrapper<UserResponse>> {
    let user = match get_user_by_username(&context.pool, username.trim()).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError("Incorrect username or password")),
    };
    let is_password_correct = verify_password_argon2(password, &user.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to verify password");
            RequestError::ServerError
        })?;
    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect username or password"));
    }

    let token = get_jwt_token(&context.config.jwt_secret, user.id).map_err(|e| {
        tracing::error!(error = %e, "failed to issue token");
        RequestError::ServerError
    })?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}
