use std::borrow::Cow;
use std::fs::File;
use std::future::Future;
use std::io::{BufReader, Write};
use std::net::{IpAddr, SocketAddr};
use std::process::exit;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use actix_cors::Cors;
use actix_web::{App, http, HttpRequest, HttpResponse, HttpServer, web};
use actix_web::dev::ServerHandle;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::web::{Data, ServiceConfig};
use bip_bencode::{ben_bytes, ben_int, ben_list, ben_map, BMutAccess};
use log::{debug, error, info};
use crate::common::common::parse_query;
use crate::stats::enums::stats_event::StatsEvent;
use crate::tracker::errors::TrackerError;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::torrent_tracker::TorrentTracker;
use crate::tracker::structs::user_id::UserId;

/// Per-listener settings injected next to the tracker handle.
#[derive(Clone)]
pub struct HttpServiceSettings {
    pub real_ip_header: String,
}

pub fn http_service_cors() -> Cors
{
    Cors::default()
        .send_wildcard()
        .allowed_methods(vec!["GET"])
        .allowed_headers(vec![http::header::X_FORWARDED_FOR, http::header::ACCEPT])
        .allowed_header(http::header::CONTENT_TYPE)
        .max_age(1)
}

pub fn http_service_routes(data: Arc<TorrentTracker>, settings: HttpServiceSettings) -> Box<dyn Fn(&mut ServiceConfig)>
{
    Box::new(move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(data.clone()));
        cfg.app_data(web::Data::new(settings.clone()));
        cfg.service(web::resource("/announce").route(web::get().to(http_service_announce)));
        cfg.service(web::resource("/announce/{passkey}").route(web::get().to(http_service_announce_passkey)));
        cfg.service(web::resource("/scrape").route(web::get().to(http_service_scrape)));
        cfg.service(web::resource("/scrape/{passkey}").route(web::get().to(http_service_scrape_passkey)));
        cfg.default_service(web::route().to(http_service_not_found));
    })
}

pub async fn http_service(
    addr: SocketAddr,
    data: Arc<TorrentTracker>,
    settings: HttpServiceSettings,
    keep_alive: u64,
    client_request_timeout: u64,
    client_disconnect_timeout: u64,
    threads: u64,
    ssl: (bool, Option<String>, Option<String>) /* 0: ssl enabled, 1: key, 2: cert */
) -> (ServerHandle, impl Future<Output=Result<(), std::io::Error>>)
{
    if ssl.0 {
        info!("[HTTP] Starting server listener with SSL on {}", addr);
        let (Some(ssl_key), Some(ssl_cert)) = (ssl.1, ssl.2) else {
            error!("[HTTP] No SSL key or SSL certificate given, exiting...");
            exit(1);
        };

        let key_file = &mut BufReader::new(match File::open(&ssl_key) {
            Ok(file) => file,
            Err(e) => {
                error!("[HTTP] Could not open SSL key {}: {}", ssl_key, e);
                exit(1);
            }
        });
        let certs_file = &mut BufReader::new(match File::open(&ssl_cert) {
            Ok(file) => file,
            Err(e) => {
                error!("[HTTP] Could not open SSL certificate {}: {}", ssl_cert, e);
                exit(1);
            }
        });

        let tls_certs = match rustls_pemfile::certs(certs_file).collect::<Result<Vec<_>, _>>() {
            Ok(certs) => certs,
            Err(e) => {
                error!("[HTTP] Could not parse SSL certificate: {}", e);
                exit(1);
            }
        };
        let tls_key = match rustls_pemfile::pkcs8_private_keys(key_file).next() {
            Some(Ok(key)) => key,
            _ => {
                error!("[HTTP] Could not parse SSL key");
                exit(1);
            }
        };

        let tls_config = match rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(tls_certs, rustls::pki_types::PrivateKeyDer::Pkcs8(tls_key))
        {
            Ok(config) => config,
            Err(e) => {
                error!("[HTTP] Invalid SSL configuration: {}", e);
                exit(1);
            }
        };

        let settings_ssl = settings.clone();
        let server = HttpServer::new(move || {
            App::new()
                .wrap(sentry_actix::Sentry::new())
                .wrap(http_service_cors())
                .configure(http_service_routes(data.clone(), settings_ssl.clone()))
        })
            .keep_alive(Duration::from_secs(keep_alive))
            .client_request_timeout(Duration::from_secs(client_request_timeout))
            .client_disconnect_timeout(Duration::from_secs(client_disconnect_timeout))
            .workers(threads as usize)
            .bind_rustls_0_23((addr.ip(), addr.port()), tls_config)
            .unwrap_or_else(|e| {
                error!("[HTTP] Unable to bind to {}: {}", addr, e);
                exit(1);
            })
            .disable_signals()
            .run();

        return (server.handle(), server);
    }

    info!("[HTTP] Starting server listener on {}", addr);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(sentry_actix::Sentry::new())
            .wrap(http_service_cors())
            .configure(http_service_routes(data.clone(), settings.clone()))
    })
        .keep_alive(Duration::from_secs(keep_alive))
        .client_request_timeout(Duration::from_secs(client_request_timeout))
        .client_disconnect_timeout(Duration::from_secs(client_disconnect_timeout))
        .workers(threads as usize)
        .bind((addr.ip(), addr.port()))
        .unwrap_or_else(|e| {
            error!("[HTTP] Unable to bind to {}: {}", addr, e);
            exit(1);
        })
        .disable_signals()
        .run();

    (server.handle(), server)
}

/// Renders a tracker failure as a bencoded `failure reason` body with
/// the HTTP status the error maps to, so BitTorrent clients see a
/// protocol-level reason and plain HTTP middleboxes see a real status.
fn http_service_failure(error: &TrackerError) -> HttpResponse
{
    let status = StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).content_type(ContentType::plaintext()).body(ben_map! {
        "failure reason" => ben_bytes!(error.to_string())
    }.encode())
}

pub async fn http_service_announce(request: HttpRequest, data: Data<Arc<TorrentTracker>>, settings: Data<HttpServiceSettings>) -> HttpResponse
{
    let ip = match http_validate_ip(&request, &data, &settings) {
        Ok(ip) => ip,
        Err(result) => { return result; }
    };

    if ip.is_ipv4() {
        data.update_stats(StatsEvent::Tcp4AnnouncesHandled, 1);
    } else {
        data.update_stats(StatsEvent::Tcp6AnnouncesHandled, 1);
    }

    http_service_announce_handler(request, ip, data.as_ref().clone(), None).await
}

pub async fn http_service_announce_passkey(request: HttpRequest, path: web::Path<String>, data: Data<Arc<TorrentTracker>>, settings: Data<HttpServiceSettings>) -> HttpResponse
{
    let ip = match http_validate_ip(&request, &data, &settings) {
        Ok(ip) => ip,
        Err(result) => { return result; }
    };

    if ip.is_ipv4() {
        data.update_stats(StatsEvent::Tcp4AnnouncesHandled, 1);
    } else {
        data.update_stats(StatsEvent::Tcp6AnnouncesHandled, 1);
    }

    let user_id = match data.authenticate(&path.into_inner()).await {
        Ok(user_id) => user_id,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    http_service_announce_handler(request, ip, data.as_ref().clone(), Some(user_id)).await
}

pub async fn http_service_announce_handler(request: HttpRequest, ip: IpAddr, data: Arc<TorrentTracker>, user_id: Option<UserId>) -> HttpResponse
{
    let query_map = match parse_query(Some(request.query_string().to_string())) {
        Ok(result) => result,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    let announce = match data.validate_announce_request(ip, query_map) {
        Ok(result) => result,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    let (counts, peers) = match data.handle_announce(&announce, user_id).await {
        Ok(result) => result,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    let config = data.config.load();
    let interval = config.tracker_config.announce_interval;
    let interval_minimum = config.tracker_config.announce_interval_minimum;

    if announce.compact {
        return http_service_announce_compact(ip, &counts, &peers, interval, interval_minimum);
    }
    http_service_announce_verbose(ip, &counts, &peers, announce.no_peer_id, interval, interval_minimum)
}

/// BEP 23 compact form: 6 bytes per IPv4 peer, 18 per IPv6 peer, under
/// `peers` or `peers6` matching the requester's address family.
fn http_service_announce_compact(ip: IpAddr, counts: &TorrentEntry, peers: &[(PeerId, TorrentPeer)], interval: u64, interval_minimum: u64) -> HttpResponse
{
    let mut compact: Vec<u8> = Vec::new();
    for (_peer_id, peer) in peers {
        if peer.ip.is_ipv4() != ip.is_ipv4() {
            continue;
        }
        let _ = match peer.ip {
            IpAddr::V4(v4) => compact.write(&u32::from(v4).to_be_bytes()),
            IpAddr::V6(v6) => compact.write(&u128::from(v6).to_be_bytes()),
        };
        let _ = compact.write(&peer.port.to_be_bytes());
    }
    let peers_key = if ip.is_ipv4() { "peers" } else { "peers6" };
    let mut body = ben_map! {
        "interval" => ben_int!(interval as i64),
        "min interval" => ben_int!(interval_minimum as i64),
        "complete" => ben_int!(counts.seeders as i64),
        "incomplete" => ben_int!(counts.leechers as i64),
        "downloaded" => ben_int!(counts.completed as i64)
    };
    if let Some(dict) = body.dict_mut() {
        dict.insert(Cow::from(peers_key.as_bytes()), ben_bytes!(compact));
    }
    HttpResponse::Ok().content_type(ContentType::plaintext()).body(body.encode())
}

fn http_service_announce_verbose(ip: IpAddr, counts: &TorrentEntry, peers: &[(PeerId, TorrentPeer)], no_peer_id: bool, interval: u64, interval_minimum: u64) -> HttpResponse
{
    let mut peers_list = ben_list!();
    if let Some(list) = peers_list.list_mut() {
        for (peer_id, peer) in peers {
            if peer.ip.is_ipv4() != ip.is_ipv4() {
                continue;
            }
            if no_peer_id {
                list.push(ben_map! {
                    "ip" => ben_bytes!(peer.ip.to_string()),
                    "port" => ben_int!(peer.port as i64)
                });
            } else {
                list.push(ben_map! {
                    "peer id" => ben_bytes!(peer_id.0.to_vec()),
                    "ip" => ben_bytes!(peer.ip.to_string()),
                    "port" => ben_int!(peer.port as i64)
                });
            }
        }
    }
    HttpResponse::Ok().content_type(ContentType::plaintext()).body(ben_map! {
        "interval" => ben_int!(interval as i64),
        "min interval" => ben_int!(interval_minimum as i64),
        "complete" => ben_int!(counts.seeders as i64),
        "incomplete" => ben_int!(counts.leechers as i64),
        "downloaded" => ben_int!(counts.completed as i64),
        "peers" => peers_list
    }.encode())
}

pub async fn http_service_scrape(request: HttpRequest, data: Data<Arc<TorrentTracker>>, settings: Data<HttpServiceSettings>) -> HttpResponse
{
    let ip = match http_validate_ip(&request, &data, &settings) {
        Ok(ip) => ip,
        Err(result) => { return result; }
    };

    debug!("[DEBUG] Request from {}: Scrape", ip);

    if ip.is_ipv4() {
        data.update_stats(StatsEvent::Tcp4ScrapesHandled, 1);
    } else {
        data.update_stats(StatsEvent::Tcp6ScrapesHandled, 1);
    }

    http_service_scrape_handler(request, ip, data.as_ref().clone()).await
}

pub async fn http_service_scrape_passkey(request: HttpRequest, path: web::Path<String>, data: Data<Arc<TorrentTracker>>, settings: Data<HttpServiceSettings>) -> HttpResponse
{
    let ip = match http_validate_ip(&request, &data, &settings) {
        Ok(ip) => ip,
        Err(result) => { return result; }
    };

    debug!("[DEBUG] Request from {}: Scrape with passkey", ip);

    if ip.is_ipv4() {
        data.update_stats(StatsEvent::Tcp4ScrapesHandled, 1);
    } else {
        data.update_stats(StatsEvent::Tcp6ScrapesHandled, 1);
    }

    if let Err(e) = data.authenticate(&path.into_inner()).await {
        http_service_stats_failure(&data, ip);
        return http_service_failure(&e);
    }

    http_service_scrape_handler(request, ip, data.as_ref().clone()).await
}

pub async fn http_service_scrape_handler(request: HttpRequest, ip: IpAddr, data: Arc<TorrentTracker>) -> HttpResponse
{
    let query_map = match parse_query(Some(request.query_string().to_string())) {
        Ok(result) => result,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    let scrape = match data.validate_scrape_request(query_map) {
        Ok(result) => result,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    let scraped = match data.handle_scrape(&scrape).await {
        Ok(result) => result,
        Err(e) => {
            http_service_stats_failure(&data, ip);
            return http_service_failure(&e);
        }
    };

    let config = data.config.load();
    let mut files = ben_map!();
    if let Some(dict) = files.dict_mut() {
        for (info_hash, entry) in scraped.iter() {
            dict.insert(Cow::from(info_hash.0.to_vec()), ben_map! {
                "complete" => ben_int!(entry.seeders as i64),
                "downloaded" => ben_int!(entry.completed as i64),
                "incomplete" => ben_int!(entry.leechers as i64)
            });
        }
    }
    HttpResponse::Ok().content_type(ContentType::plaintext()).body(ben_map! {
        "interval" => ben_int!(config.tracker_config.announce_interval as i64),
        "min interval" => ben_int!(config.tracker_config.announce_interval_minimum as i64),
        "files" => files
    }.encode())
}

pub async fn http_service_not_found(request: HttpRequest, data: Data<Arc<TorrentTracker>>, settings: Data<HttpServiceSettings>) -> HttpResponse
{
    let ip = match http_validate_ip(&request, &data, &settings) {
        Ok(ip) => ip,
        Err(result) => { return result; }
    };

    debug!("[DEBUG] Request from {}: 404 Not Found", ip);
    if ip.is_ipv4() {
        data.update_stats(StatsEvent::Tcp4NotFound, 1);
    } else {
        data.update_stats(StatsEvent::Tcp6NotFound, 1);
    }

    HttpResponse::NotFound().content_type(ContentType::plaintext()).body(ben_map! {
        "failure reason" => ben_bytes!("unknown request")
    }.encode())
}

fn http_service_stats_failure(data: &Arc<TorrentTracker>, ip: IpAddr)
{
    if ip.is_ipv4() {
        data.update_stats(StatsEvent::Tcp4Failure, 1);
    } else {
        data.update_stats(StatsEvent::Tcp6Failure, 1);
    }
}

/// Resolves the client address, honoring the trusted-proxy header when
/// configured for this listener.
pub fn http_service_retrieve_remote_ip(request: &HttpRequest, real_ip_header: &str) -> Result<IpAddr, ()>
{
    let origin_ip = match request.peer_addr() {
        None => { return Err(()); }
        Some(addr) => addr.ip(),
    };
    match request.headers().get(real_ip_header) {
        Some(header) => {
            match header.to_str().ok().and_then(|value| IpAddr::from_str(value).ok()) {
                Some(ip) => Ok(ip),
                None => Err(()),
            }
        }
        None => Ok(origin_ip),
    }
}

pub fn http_validate_ip(request: &HttpRequest, data: &Data<Arc<TorrentTracker>>, settings: &Data<HttpServiceSettings>) -> Result<IpAddr, HttpResponse>
{
    match http_service_retrieve_remote_ip(request, &settings.real_ip_header) {
        Ok(ip) => {
            if ip.is_ipv4() {
                data.update_stats(StatsEvent::Tcp4ConnectionsHandled, 1);
            } else {
                data.update_stats(StatsEvent::Tcp6ConnectionsHandled, 1);
            }
            Ok(ip)
        }
        Err(_) => {
            Err(HttpResponse::BadRequest().content_type(ContentType::plaintext()).body(ben_map! {
                "failure reason" => ben_bytes!("unknown origin ip")
            }.encode()))
        }
    }
}
