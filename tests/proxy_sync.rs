use chrono::NaiveDate;
use medpractice::api::PracticeApi;
use medpractice::commands::appointments::AppointmentFilter;
use medpractice::error::ErrorKind;
use medpractice::model::{AppointmentDraft, Patient, PatientDraft, Physician, PhysicianDraft};
use medpractice::proxy::ProxyPractice;
use medpractice::remote::RemoteClient;
use medpractice::server;
use medpractice::store::memory::InMemoryStore;
use std::sync::Arc;
use std::time::Duration;

type Server = Arc<PracticeApi<InMemoryStore>>;

/// Serve a fresh in-memory practice on an ephemeral port from its own runtime.
fn spawn_server() -> (String, Server) {
    let api: Server = Arc::new(PracticeApi::open(InMemoryStore::new()).unwrap());
    let app = server::router(api.clone());

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    (format!("http://{}", addr), api)
}

fn proxy_for(url: &str) -> ProxyPractice<InMemoryStore> {
    let local = PracticeApi::open(InMemoryStore::new()).unwrap();
    let remote = RemoteClient::new(url, Duration::from_secs(5)).unwrap();
    ProxyPractice::new(local, Some(remote))
}

fn patient(first: &str, last: &str) -> PatientDraft {
    PatientDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: String::new(),
        birthdate: NaiveDate::from_ymd_opt(1990, 1, 31).unwrap(),
        race: None,
        gender: None,
    }
}

fn physician(license: &str) -> PhysicianDraft {
    PhysicianDraft {
        first_name: "Gregory".to_string(),
        last_name: "House".to_string(),
        license_number: license.to_string(),
        graduation: NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
        specialization: None,
    }
}

fn monday(start: u32, end: u32) -> AppointmentDraft {
    let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    AppointmentDraft {
        patient_id: 1,
        physician_id: 1,
        start: day.and_hms_opt(start, 0, 0).unwrap(),
        end: day.and_hms_opt(end, 0, 0).unwrap(),
    }
}

#[test]
fn the_mirror_takes_server_assigned_ids() {
    let (url, server) = spawn_server();
    server.create(patient("Ada", "Lovelace")).unwrap();
    server.create(patient("Grace", "Hopper")).unwrap();

    let proxy = proxy_for(&url);
    assert!(proxy.sync().unwrap());
    assert_eq!(proxy.local().list::<Patient>().unwrap().len(), 2);

    let created = proxy.create(patient("Alan", "Turing")).unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(server.get::<Patient>(3).unwrap().last_name, "Turing");
    assert_eq!(proxy.local().get::<Patient>(3).unwrap(), created);
}

#[test]
fn server_rejections_are_returned_not_masked() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);

    // Created behind the mirror's back, so only the server can refuse it
    server.create(physician("ABC123")).unwrap();
    let err = proxy.create(physician("abc123")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateLicense);
    assert!(proxy.local().list::<Physician>().unwrap().is_empty());
}

#[test]
fn rows_gone_from_the_server_leave_the_mirror_on_get() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);
    let created = proxy.create(patient("Ada", "Lovelace")).unwrap();
    assert_eq!(proxy.local().list::<Patient>().unwrap().len(), 1);

    server.delete::<Patient>(created.id).unwrap();
    let err = proxy.get::<Patient>(created.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(proxy.local().list::<Patient>().unwrap().is_empty());
}

#[test]
fn rows_gone_from_the_server_leave_the_mirror_on_delete() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);
    let created = proxy.create(patient("Ada", "Lovelace")).unwrap();

    server.delete::<Patient>(created.id).unwrap();
    let err = proxy.delete::<Patient>(created.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(proxy.local().list::<Patient>().unwrap().is_empty());
}

#[test]
fn a_stale_mirror_is_refreshed_before_refusing_a_booking() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);
    assert!(proxy.sync().unwrap());

    // The mirror has never seen either of these
    server.create(patient("Ada", "Lovelace")).unwrap();
    server.create(physician("LIC-1")).unwrap();

    let booked = proxy.create(monday(9, 10)).unwrap();
    assert_eq!(booked.id, 1);
    assert_eq!(server.appointments(AppointmentFilter::default()).unwrap().len(), 1);
    assert_eq!(proxy.local().list::<Patient>().unwrap().len(), 1);
}

#[test]
fn a_stale_mirror_is_refreshed_before_refusing_an_update() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);
    let created = server.create(patient("Ada", "Byron")).unwrap();

    let updated = proxy.update(created.id, patient("Ada", "Lovelace")).unwrap();
    assert_eq!(server.get::<Patient>(created.id).unwrap(), updated);
    assert_eq!(proxy.local().get::<Patient>(created.id).unwrap(), updated);
}

#[test]
fn refusals_that_survive_a_refresh_stay_local() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);

    let err = proxy.create(monday(9, 10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    assert!(server.appointments(AppointmentFilter::default()).unwrap().is_empty());
}

#[test]
fn local_validation_stops_requests_before_the_network() {
    let (url, server) = spawn_server();
    server.create(patient("Ada", "Lovelace")).unwrap();
    server.create(physician("LIC-1")).unwrap();

    let proxy = proxy_for(&url);
    assert!(proxy.sync().unwrap());
    proxy.create(monday(9, 10)).unwrap();

    let err = proxy.create(monday(9, 11)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DoubleBooked);
    assert_eq!(server.appointments(AppointmentFilter::default()).unwrap().len(), 1);
}

#[test]
fn updates_and_deletes_reach_the_server() {
    let (url, server) = spawn_server();
    let proxy = proxy_for(&url);

    let created = proxy.create(patient("Ada", "Byron")).unwrap();
    let updated = proxy.update(created.id, patient("Ada", "Lovelace")).unwrap();
    assert_eq!(server.get::<Patient>(created.id).unwrap(), updated);

    let removed = proxy.delete::<Patient>(created.id).unwrap();
    assert_eq!(removed, Some(updated));
    assert!(server.list::<Patient>().unwrap().is_empty());
    assert!(proxy.local().list::<Patient>().unwrap().is_empty());
}

#[test]
fn filtered_listings_pass_through() {
    let (url, server) = spawn_server();
    server.create(patient("Ada", "Lovelace")).unwrap();
    server.create(patient("Grace", "Hopper")).unwrap();
    server.create(physician("LIC-1")).unwrap();
    server.create(monday(9, 10)).unwrap();
    let mut second = monday(10, 11);
    second.patient_id = 2;
    server.create(second).unwrap();

    let proxy = proxy_for(&url);
    let filter = AppointmentFilter {
        patient_id: Some(2),
        physician_id: None,
    };
    let found = proxy.appointments(filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 2);

    let everyone: Vec<Patient> = proxy.search("").unwrap();
    assert_eq!(everyone.len(), 2);
}
