// src/handlers/pages.rs
use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use log::error;
use serde::Deserialize;
use std::fmt::Write;

use crate::assets::{flag_url, map_thumbnail_url};
use crate::browser::detail::{connect_uri, segment_name, ServerDetail};
use crate::browser::fetch::ServerSource;
use crate::browser::filter::{Choice, FilterCriteria};
use crate::browser::pagination::PageItem;
use crate::browser::state::{Message, ServerListState};
use crate::filter_panel::{parse_tags, FilterEvent, GAME_MODES, REGIONS};
use crate::handlers::Upstream;
use crate::news::{author_avatar, ContentError, NewsStore, Post, PostSummary};
use crate::render::{colored_name, escape_html, layout};
use crate::utils::{check_rate_limit, ClientRateLimiter, GatewayError};

/// Filter and page selection carried in the list page's query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub game: Option<String>,
    pub region: Option<String>,
    pub full: Option<String>,
    pub empty: Option<String>,
    pub private: Option<String>,
    pub tags: Option<String>,
    pub page: Option<String>,
}

fn flag(value: &Option<String>) -> Option<bool> {
    value.as_deref().map(|v| {
        !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        )
    })
}

impl ListQuery {
    /// The panel events equivalent to this query.
    pub fn events(&self) -> Vec<FilterEvent> {
        let mut events = Vec::new();
        if let Some(game) = &self.game {
            events.push(FilterEvent::GameMode(Choice::parse(game)));
        }
        if let Some(region) = &self.region {
            events.push(FilterEvent::Region(Choice::parse(region)));
        }
        if let Some(show) = flag(&self.full) {
            events.push(FilterEvent::ShowFull(show));
        }
        if let Some(show) = flag(&self.empty) {
            events.push(FilterEvent::ShowEmpty(show));
        }
        if let Some(show) = flag(&self.private) {
            events.push(FilterEvent::ShowPrivate(show));
        }
        if let Some(tags) = &self.tags {
            events.push(FilterEvent::Tags(parse_tags(tags)));
        }
        events
    }

    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    /// Query string for `page` under the given filters.
    fn link(criteria: &FilterCriteria, page: usize) -> String {
        let tags: Vec<&str> = criteria.tags.iter().map(String::as_str).collect();
        let yes_no = |show: bool| if show { "1" } else { "0" };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("game", criteria.game_mode.as_str())
            .append_pair("region", criteria.continent.as_str())
            .append_pair("full", yes_no(criteria.show_full_servers))
            .append_pair("empty", yes_no(criteria.show_empty_servers))
            .append_pair("private", yes_no(criteria.show_private_servers))
            .append_pair("tags", &tags.join(","))
            .append_pair("page", &page.to_string())
            .finish();
        format!("/?{}", query)
    }
}

/// One mount of the server list: a single fetch, then the query's filters
/// and page applied in order.
async fn load_state<S: ServerSource>(source: &S, query: &ListQuery) -> ServerListState {
    let mut state = ServerListState::new();
    state.update(Message::FetchCompleted(source.fetch_servers().await));
    for event in query.events() {
        state.update(Message::Filter(event));
    }
    // Scroll effects are moot here, a fresh page load is already at the top.
    state.update(Message::GoToPage(query.page()));
    state
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

fn not_found(what: &str) -> HttpResponse {
    html(
        StatusCode::NOT_FOUND,
        layout("Not found", &format!("<p>{} not found</p>", escape_html(what))),
    )
}

fn select(name: &str, options: &[(&str, &str)], current: &str) -> String {
    let mut out = format!("<select name=\"{}\">", name);
    for (label, value) in options {
        let selected = if value.eq_ignore_ascii_case(current) { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            escape_html(value),
            selected,
            escape_html(label)
        );
    }
    out.push_str("</select>");
    out
}

fn render_filter_form(criteria: &FilterCriteria) -> String {
    let toggle = |name: &str, label: &str, show: bool| {
        format!(
            "<label>{} {}</label>",
            label,
            select(name, &[("Yes", "1"), ("No", "0")], if show { "1" } else { "0" })
        )
    };
    let tags: Vec<&str> = criteria.tags.iter().map(String::as_str).collect();

    format!(
        "<form class=\"filters\" method=\"get\" action=\"/\">{}{}{}{}{}\
         <input type=\"text\" name=\"tags\" placeholder=\"tags, comma separated\" value=\"{}\">\
         <button type=\"submit\">Filter</button></form>",
        select("game", GAME_MODES, criteria.game_mode.as_str()),
        select("region", REGIONS, criteria.continent.as_str()),
        toggle("full", "Show full servers", criteria.show_full_servers),
        toggle("empty", "Show empty servers", criteria.show_empty_servers),
        toggle("private", "Show private servers", criteria.show_private_servers),
        escape_html(&tags.join(", ")),
    )
}

fn render_pagination(state: &ServerListState) -> String {
    let criteria = state.filters();
    let current = state.current_page();
    let mut out = String::from("<nav class=\"pagination\">");

    if current > 1 {
        let _ = write!(
            out,
            "<a href=\"{}\" rel=\"prev\">Previous</a>",
            escape_html(&ListQuery::link(criteria, current - 1))
        );
    }
    for item in state.indicators() {
        match item {
            PageItem::Page(page) if page == current => {
                let _ = write!(out, "<span aria-current=\"page\">{}</span>", page);
            }
            PageItem::Page(page) => {
                let _ = write!(
                    out,
                    "<a href=\"{}\">{}</a>",
                    escape_html(&ListQuery::link(criteria, page)),
                    page
                );
            }
            PageItem::Ellipsis => out.push_str("<span class=\"ellipsis\">&hellip;</span>"),
        }
    }
    if current < state.total_pages() {
        let _ = write!(
            out,
            "<a href=\"{}\" rel=\"next\">Next</a>",
            escape_html(&ListQuery::link(criteria, current + 1))
        );
    }
    out.push_str("</nav>");
    out
}

pub fn render_server_list(state: &ServerListState) -> String {
    let mut body = render_filter_form(state.filters());
    let page = state.page();

    if page.is_empty() {
        body.push_str("<p class=\"empty\">No servers found</p>");
    } else {
        let _ = write!(body, "<p class=\"count\">{} servers</p><table class=\"servers\"><tbody>", state.filtered_count());
        for server in page {
            let _ = write!(
                body,
                "<tr><td><img src=\"{flag}\" alt=\"{code} flag\" width=\"24\"></td>\
                 <td><a href=\"/server/{address}\">{name}</a></td>\
                 <td>{humans}/{max}</td>\
                 <td><img src=\"{thumb}\" alt=\"\" width=\"64\"> {map}</td>\
                 <td>{mode}</td></tr>",
                flag = escape_html(&flag_url(&server.country.code)),
                code = escape_html(&server.country.code),
                address = escape_html(&server.address),
                name = colored_name(&segment_name(&server.name)),
                humans = server.human_count,
                max = server.max_players,
                thumb = escape_html(&map_thumbnail_url(&server.map_name)),
                map = escape_html(&server.map_name),
                mode = escape_html(&server.game_mode),
            );
        }
        body.push_str("</tbody></table>");
    }
    body.push_str(&render_pagination(state));
    layout("Quake Live Servers", &body)
}

pub fn render_server_detail(detail: &ServerDetail) -> String {
    let mut body = format!(
        "<h1>{}</h1><p>{} &middot; {} &middot; {}/{} players &middot; {} spectators</p>",
        colored_name(&detail.name),
        escape_html(&detail.game_mode),
        escape_html(&detail.map_name),
        detail.human_count,
        detail.max_players,
        detail.spectator_count,
    );
    body.push_str("<ul class=\"roster\">");
    for player in &detail.players {
        let _ = write!(
            body,
            "<li{}>{} <span class=\"score\">{}</span></li>",
            if player.spectator { " class=\"spectator\"" } else { "" },
            colored_name(&player.segments),
            escape_html(&player.label),
        );
    }
    body.push_str("</ul>");
    if detail.connect_uri.is_some() {
        let _ = write!(
            body,
            "<a class=\"connect\" href=\"/connect/{}\">Connect</a>",
            escape_html(&detail.address)
        );
    }
    let title: String = detail.name.iter().map(|s| s.text.as_str()).collect();
    layout(&title, &body)
}

fn render_news_index(posts: &[PostSummary]) -> String {
    let mut body = String::from("<h1>News</h1>");
    if posts.is_empty() {
        body.push_str("<p>No news yet</p>");
    }
    for post in posts {
        let _ = write!(
            body,
            "<article class=\"news-card\"><img src=\"{}\" alt=\"\">\
             <h2><a href=\"/news/{}\">{}</a></h2><p class=\"meta\">{} &middot; {}</p><p>{}</p></article>",
            escape_html(&post.cover),
            escape_html(&post.id),
            escape_html(&post.title),
            escape_html(&post.date),
            escape_html(&post.author),
            escape_html(&post.excerpt),
        );
    }
    layout("News", &body)
}

fn render_news_post(post: &Post) -> String {
    let summary = &post.summary;
    let avatar = author_avatar(&summary.author)
        .map(|src| format!("<img class=\"avatar\" src=\"{}\" alt=\"\">", escape_html(src)))
        .unwrap_or_default();
    let body = format!(
        "<article><h1>{}</h1><p class=\"meta\">{}{} &middot; {}</p>{}</article>",
        escape_html(&summary.title),
        avatar,
        escape_html(&summary.author),
        escape_html(&summary.date),
        post.content_html,
    );
    layout(&summary.title, &body)
}

pub async fn index(
    req: HttpRequest,
    upstream: web::Data<Upstream>,
    rate_limiter: web::Data<ClientRateLimiter>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, GatewayError> {
    check_rate_limit(&req, &rate_limiter, &upstream.config.trusted_proxies)?;

    let state = load_state(&upstream.aggregator, &query).await;
    Ok(html(StatusCode::OK, render_server_list(&state)))
}

pub async fn server_detail(
    req: HttpRequest,
    upstream: web::Data<Upstream>,
    rate_limiter: web::Data<ClientRateLimiter>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    check_rate_limit(&req, &rate_limiter, &upstream.config.trusted_proxies)?;

    let address = path.into_inner();
    let mut state = load_state(&upstream.aggregator, &ListQuery::default()).await;

    if let Some(page) = state.page_of(&address) {
        state.update(Message::GoToPage(page));
        state.update(Message::Select(address.clone()));
    }
    Ok(match state.selected() {
        Some(server) => html(StatusCode::OK, render_server_detail(&ServerDetail::from_server(server))),
        None => not_found(&format!("Server {}", address)),
    })
}

/// Hands off to the game client through the Steam URI scheme.
pub async fn connect(path: web::Path<String>) -> HttpResponse {
    match connect_uri(&path) {
        Some(uri) => HttpResponse::Found().insert_header((LOCATION, uri)).finish(),
        None => HttpResponse::BadRequest().body("Missing server address"),
    }
}

pub async fn news_index(store: web::Data<NewsStore>) -> HttpResponse {
    let store = store.get_ref().clone();
    match web::block(move || store.summaries()).await {
        Ok(Ok(posts)) => html(StatusCode::OK, render_news_index(&posts)),
        Ok(Err(e)) => {
            error!("Error reading posts: {}", e);
            html(StatusCode::INTERNAL_SERVER_ERROR, layout("News", "<p>News is unavailable</p>"))
        }
        Err(e) => {
            error!("News worker failed: {}", e);
            html(StatusCode::INTERNAL_SERVER_ERROR, layout("News", "<p>News is unavailable</p>"))
        }
    }
}

pub async fn news_post(store: web::Data<NewsStore>, path: web::Path<String>) -> HttpResponse {
    let store = store.get_ref().clone();
    let id = path.into_inner();
    let lookup = id.clone();
    match web::block(move || store.post(&lookup)).await {
        Ok(Ok(post)) => html(StatusCode::OK, render_news_post(&post)),
        Ok(Err(ContentError::NotFound(_))) => not_found(&format!("Post {}", id)),
        Ok(Err(e)) => {
            error!("Error reading post {}: {}", id, e);
            html(StatusCode::INTERNAL_SERVER_ERROR, layout("News", "<p>News is unavailable</p>"))
        }
        Err(e) => {
            error!("News worker failed: {}", e);
            html(StatusCode::INTERNAL_SERVER_ERROR, layout("News", "<p>News is unavailable</p>"))
        }
    }
}
