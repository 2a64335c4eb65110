use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use hotelbook::config::Config;
use hotelbook::core::auth::Authenticator;
use hotelbook::mail::MailQueue;
use hotelbook::models::MailData;
use hotelbook::registry::AppRegistry;
use hotelbook::render::JsonRenderer;
use hotelbook::session::SessionStore;
use hotelbook::store::{AvailabilityStore, MemoryStore};
use hotelbook::web::router;
use hotelbook::web::session::COOKIE_NAME;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

mod common;
use common::date;

const ADMIN_EMAIL: &str = "admin@hotelbook.local";
const ADMIN_PASSWORD: &str = "supersecret";

const BOOKING: &str = "start-date=2050-01-01&end-date=2050-01-03&first-name=Yusuf\
                       &last-name=Grenada&email=yg%40yg.com&phone=222-122-0122";

/// A browser stand-in: carries the session cookie between requests.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    async fn send(&mut self, mut req: Request<Body>) -> Response<Body> {
        if let Some(c) = &self.cookie {
            req.headers_mut().insert(COOKIE, c.parse().unwrap());
        }
        let resp = self.app.clone().oneshot(req).await.unwrap();
        if let Some(set) = resp.headers().get(SET_COOKIE) {
            let pair = set.to_str().unwrap().split(';').next().unwrap().to_string();
            assert!(pair.starts_with(COOKIE_NAME));
            self.cookie = Some(pair);
        }
        resp
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    async fn post(&mut self, uri: &str, form: &str) -> Response<Body> {
        let req = Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(req).await
    }

    /// GET and decode the rendered page.
    async fn page(&mut self, uri: &str) -> Value {
        let resp = self.get(uri).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);
        json(resp).await
    }

    async fn login(&mut self) {
        let resp = self
            .post(
                "/user/login",
                &format!("email={}&password={}", ADMIN_EMAIL, ADMIN_PASSWORD),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
    }
}

struct TestApp {
    client: Client,
    store: Arc<MemoryStore>,
    sessions: Arc<SessionStore>,
    _outbox: UnboundedReceiver<MailData>,
}

impl TestApp {
    fn add_admin(&self) {
        Authenticator::new(self.store.clone())
            .create_user("Ada", "Admin", ADMIN_EMAIL, ADMIN_PASSWORD, 3)
            .unwrap();
    }

    async fn login(&mut self) {
        self.add_admin();
        self.client.login().await;
    }
}

fn app() -> TestApp {
    let store = Arc::new(MemoryStore::with_default_rooms());

    let (mail, outbox) = MailQueue::channel();
    let registry = AppRegistry::new(
        store.clone(),
        mail,
        Arc::new(JsonRenderer),
        &Config::default(),
    );
    let sessions = registry.sessions();
    TestApp {
        client: Client {
            app: router(registry),
            cookie: None,
        },
        store,
        sessions,
        _outbox: outbox,
    }
}

async fn json(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health() {
    let mut t = app();
    let resp = t.client.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["status"], "ok");
}

#[tokio::test]
async fn test_pages_render_and_set_cookie() {
    let mut t = app();

    for (uri, template) in [
        ("/", "home.page"),
        ("/about", "about.page"),
        ("/contact", "contact.page"),
        ("/search-availability", "search-availability.page"),
        ("/user/login", "login.page"),
    ] {
        let page = t.client.page(uri).await;
        assert_eq!(page["template"], template);
        assert_eq!(page["is_authenticated"], false);
    }
    // nothing was written to the session yet
    assert!(t.client.cookie.is_none());

    let page = t.client.page("/rooms/1").await;
    assert_eq!(page["data"]["room"]["room_name"], "General's Quarters");
}

#[tokio::test]
async fn test_unknown_room_redirects_home() {
    let mut t = app();
    let resp = t.client.get("/rooms/9").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(t.client.cookie.is_some());

    let home = t.client.page("/").await;
    assert_eq!(home["error"], "Room 9 not found");
    assert_eq!(t.sessions.len(), 1);
}

#[tokio::test]
async fn test_cookieless_requests_store_no_session() {
    let mut t = app();

    for _ in 0..100 {
        let resp = t.client.get("/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(SET_COOKIE).is_none());
    }
    t.client.page("/").await;
    t.client.page("/search-availability").await;
    let resp = t
        .client
        .post("/search-availability-json", "start=2050-01-04&end=2050-01-05&room_id=1")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(t.client.cookie.is_none());
    assert_eq!(t.sessions.len(), 0);
}

#[tokio::test]
async fn test_search_availability() {
    let mut t = app();

    let resp = t
        .client
        .post("/search-availability", "start=2050-01-01&end=2050-01-03")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json(resp).await;
    assert_eq!(page["template"], "choose-room.page");
    assert_eq!(page["data"]["rooms"].as_array().unwrap().len(), 2);

    let resp = t
        .client
        .post("/search-availability", "start=bogus&end=2050-01-03")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = t
        .client
        .post("/search-availability", "start=2050-01-05&end=2050-01-03")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/search-availability");
}

#[tokio::test]
async fn test_search_without_free_rooms() {
    let mut t = app();
    t.store.insert_block(1, date("2050-01-02")).unwrap();
    t.store.insert_block(2, date("2050-01-03")).unwrap();

    let resp = t
        .client
        .post("/search-availability", "start=2050-01-01&end=2050-01-03")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/search-availability");

    let page = t.client.page("/search-availability").await;
    assert_eq!(page["error"], "No availability");
}

#[tokio::test]
async fn test_availability_json() {
    let mut t = app();
    t.store.insert_block(1, date("2050-01-02")).unwrap();

    let probe = |body: &'static str| {
        let app = t.client.app.clone();
        async move {
            let req = Request::post("/search-availability-json")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap();
            let resp = app.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            json(resp).await
        }
    };

    let v = probe("start=2050-01-04&end=2050-01-05&room_id=1").await;
    assert_eq!(v["ok"], true);
    assert_eq!(v["roomId"], "1");
    assert_eq!(v["startDate"], "2050-01-04");
    assert_eq!(v["endDate"], "2050-01-05");

    let v = probe("start=2050-01-01&end=2050-01-02&room_id=1").await;
    assert_eq!(v["ok"], false);
    assert_eq!(v["message"], "");

    let v = probe("start=2050-01-01&end=2050-01-02&room_id=2").await;
    assert_eq!(v["ok"], true);

    let v = probe("start=nope&end=2050-01-02&room_id=1").await;
    assert_eq!(v["ok"], false);
    assert_eq!(v["message"], "Invalid request parameters");

    let v = probe("start=2050-01-05&end=2050-01-02&room_id=1").await;
    assert_eq!(v["message"], "End date is before start date");

    let v = probe("start=2060-01-01&end=2060-01-02&room_id=1").await;
    assert_eq!(v["ok"], false);
    assert_eq!(v["message"], "Error querying database");
}

#[tokio::test]
async fn test_booking_flow() {
    let mut t = app();

    let resp = t
        .client
        .post("/search-availability", "start=2050-01-01&end=2050-01-03")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = t.client.get("/choose-room/1").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/make-reservation");

    let page = t.client.page("/make-reservation").await;
    assert_eq!(page["template"], "make-reservation.page");
    assert_eq!(page["data"]["reservation"]["room_id"], 1);
    assert_eq!(page["data"]["reservation"]["room_name"], "General's Quarters");
    assert_eq!(page["string_map"]["start-date"], "2050-01-01");
    assert_eq!(page["string_map"]["end-date"], "2050-01-03");

    let resp = t
        .client
        .post("/make-reservation", &format!("{}&room-id=1", BOOKING))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/reservation-summary");

    let page = t.client.page("/reservation-summary").await;
    assert_eq!(page["data"]["reservation"]["first_name"], "Yusuf");
    assert_eq!(page["data"]["reservation"]["id"], 1);

    let rows = t
        .store
        .restrictions_for_room(1, date("2050-01-01"), date("2050-01-03"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reservation_id, Some(1));

    // the summary is shown once
    let resp = t.client.get("/reservation-summary").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_book_room_link() {
    let mut t = app();

    let resp = t
        .client
        .get("/book-room?id=1&s=2050-02-01&e=2050-02-03")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/make-reservation");

    let page = t.client.page("/make-reservation").await;
    assert_eq!(page["string_map"]["start-date"], "2050-02-01");

    let resp = t.client.get("/book-room?id=x&s=2050-02-01&e=2050-02-03").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_make_reservation_needs_a_draft() {
    let mut t = app();

    let resp = t.client.get("/make-reservation").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = t.client.get("/choose-room/1").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_rejected_reservation_is_rerendered() {
    let mut t = app();

    let body = BOOKING.replace("first-name=Yusuf", "first-name=j");
    let resp = t
        .client
        .post("/make-reservation", &format!("{}&room-id=1", body))
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let page = json(resp).await;
    assert_eq!(page["template"], "make-reservation.page");
    assert!(page["form"]["errors"]["first-name"].is_array());
    assert_eq!(page["form"]["values"]["first-name"], "j");
    assert!(
        t.store
            .restrictions_for_room(1, date("2050-01-01"), date("2050-01-03"))
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_failed_inserts_redirect_with_error() {
    let mut t = app();

    for (room, message) in [
        ("2", "Can't insert reservation into the database"),
        ("200000", "Can't insert room restriction"),
    ] {
        let resp = t
            .client
            .post("/make-reservation", &format!("{}&room-id={}", BOOKING, room))
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");

        let home = t.client.page("/").await;
        assert_eq!(home["error"], message);
    }

    let resp = t
        .client
        .post("/make-reservation", "start-date=bad&end-date=2050-01-03&room-id=1")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let home = t.client.page("/").await;
    assert!(home["error"].as_str().unwrap().starts_with("Can't parse form"));
}

#[tokio::test]
async fn test_admin_requires_login() {
    let mut t = app();

    let resp = t.client.get("/admin/dashboard").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/login");

    let page = t.client.page("/user/login").await;
    assert_eq!(page["error"], "Log in first!");
}

#[tokio::test]
async fn test_login_and_logout() {
    let mut t = app();
    t.add_admin();

    let resp = t
        .client
        .post(
            "/user/login",
            &format!("email={}&password=wrong-password", ADMIN_EMAIL),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/login");
    let page = t.client.page("/user/login").await;
    assert_eq!(page["error"], "Invalid login credentials");
    let before = t.client.cookie.clone();
    assert!(before.is_some());

    let resp = t.client.post("/user/login", "email=not-an-email&password=").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json(resp).await;
    assert!(page["form"]["errors"]["email"].is_array());
    assert!(page["form"]["values"].get("password").is_none());

    t.client.login().await;
    // login moves the session to a new id
    assert_ne!(t.client.cookie, before);

    let home = t.client.page("/").await;
    assert_eq!(home["flash"], "Logged in successfully");
    assert_eq!(home["is_authenticated"], true);

    let page = t.client.page("/admin/dashboard").await;
    assert_eq!(page["template"], "admin-dashboard.page");

    let resp = t.client.get("/user/logout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/user/login");

    let resp = t.client.get("/admin/dashboard").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_admin_reservation_management() {
    let mut t = app();
    let resp = t
        .client
        .post("/make-reservation", &format!("{}&room-id=1", BOOKING))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    t.login().await;

    let page = t.client.page("/admin/reservations-new").await;
    assert_eq!(page["data"]["reservations"].as_array().unwrap().len(), 1);
    assert_eq!(
        page["data"]["reservations"][0]["room_name"],
        "General's Quarters"
    );

    let page = t.client.page("/admin/reservations/new/1/show").await;
    assert_eq!(page["template"], "admin-reservations-show.page");
    assert_eq!(page["string_map"]["src"], "new");
    assert_eq!(page["data"]["reservation"]["email"], "yg@yg.com");

    // invalid edit comes back with errors
    let resp = t
        .client
        .post(
            "/admin/reservations/all/1",
            "first-name=Yusuf&last-name=&email=yg%40yg.com&phone=",
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = t
        .client
        .post(
            "/admin/reservations/all/1",
            "first-name=Jane&last-name=Doe&email=jane%40example.com&phone=555",
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/reservations-all");

    let page = t.client.page("/admin/reservations-all").await;
    assert_eq!(page["flash"], "Changes saved");
    assert_eq!(page["data"]["reservations"][0]["first_name"], "Jane");

    let resp = t.client.get("/admin/process-reservation/new/1").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/reservations-new");
    let page = t.client.page("/admin/reservations-new").await;
    assert_eq!(page["flash"], "Reservation marked as processed");
    assert!(page["data"]["reservations"].as_array().unwrap().is_empty());

    let resp = t
        .client
        .get("/admin/delete-reservation/cal/1?y=2050&m=01")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/admin/reservations-calendar?y=2050&m=01"
    );
    let page = t.client.page("/admin/reservations-all").await;
    assert!(page["data"]["reservations"].as_array().unwrap().is_empty());
    assert!(
        t.store
            .search_availability_by_room(1, date("2050-01-01"), date("2050-01-03"))
            .unwrap()
    );

    let resp = t.client.get("/admin/reservations/all/1/show").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/reservations-all");

    let resp = t.client.get("/admin/reservations/bogus/1/show").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/dashboard");
}

#[tokio::test]
async fn test_admin_calendar_blocks() {
    let mut t = app();
    let resp = t
        .client
        .post("/make-reservation", &format!("{}&room-id=1", BOOKING))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    t.login().await;

    let page = t
        .client
        .page("/admin/reservations-calendar?y=2050&m=01")
        .await;
    assert_eq!(page["template"], "admin-reservations-calendar.page");
    assert_eq!(page["int_map"]["daysInMonth"], 31);
    assert_eq!(page["string_map"]["thisMonth"], "01");
    assert_eq!(page["string_map"]["lastMonthYear"], "2049");
    assert_eq!(page["data"]["reservation_map_1"]["2050-01-02"], 1);
    assert_eq!(page["data"]["block_map_2"]["2050-01-20"], 0);

    let resp = t
        .client
        .post(
            "/admin/reservations-calendar",
            "y=2050&m=01&add_block_1_2050-01-02=on&add_block_2_2050-01-20=on",
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/admin/reservations-calendar?y=2050&m=01"
    );

    let page = t
        .client
        .page("/admin/reservations-calendar?y=2050&m=01")
        .await;
    assert_eq!(page["flash"], "Changes saved");
    assert_eq!(page["warning"], "1 reserved day(s) were not blocked");
    let block_id = page["data"]["block_map_2"]["2050-01-20"].as_i64().unwrap();
    assert!(block_id > 0);
    assert_eq!(page["data"]["block_map_1"]["2050-01-02"], 0);

    // leaving the remove box unticked deletes the block
    let resp = t
        .client
        .post("/admin/reservations-calendar", "y=2050&m=01")
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(
        t.store
            .search_availability_by_room(2, date("2050-01-20"), date("2050-01-20"))
            .unwrap()
    );
}

#[tokio::test]
async fn test_calendar_post_without_loaded_calendar() {
    let mut t = app();
    t.login().await;

    let resp = t
        .client
        .post(
            "/admin/reservations-calendar",
            "y=2050&m=01&add_block_2_2050-01-20=on",
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let page = t
        .client
        .page("/admin/reservations-calendar?y=2050&m=01")
        .await;
    assert_eq!(
        page["error"],
        "The calendar changed since it was loaded, please try again"
    );
    assert!(
        t.store
            .search_availability_by_room(2, date("2050-01-20"), date("2050-01-20"))
            .unwrap()
    );
}
