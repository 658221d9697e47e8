//! URL を取得してボディを標準出力に書き出す例
//!
//! 使い方:
//!   cargo run -p http11_fetch -- https://en.wikipedia.org/wiki/HTTP
//!   cargo run -p http11_fetch -- --data 'q=rust' http://httpbin.org/post
//!   RUST_LOG=debug cargo run -p http11_fetch -- --head http://example.com/

use std::io::Write;

use http11_transport::{Request, Session};
use http11_transport_net::{ConnectOptions, TlsContext, connect_to, default_port};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "http11_fetch";

    noargs::HELP_FLAG.take_help(&mut args);

    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let head_only: bool = noargs::flag("head")
        .short('I')
        .doc("Print status line and headers instead of the body")
        .take(&mut args)
        .is_present();

    let user_agent: Option<String> = noargs::opt("user-agent")
        .short('A')
        .doc("User-Agent header value")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let referer: Option<String> = noargs::opt("referer")
        .short('e')
        .doc("Referer header value")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let cookie: Option<String> = noargs::opt("cookie")
        .short('b')
        .doc("Cookie header value")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 指定した場合は POST になる
    let data: Option<String> = noargs::opt("data")
        .short('d')
        .doc("Form-encoded request body (sends POST)")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    let url: String = noargs::arg("<URL>")
        .doc("URL to fetch (e.g., https://example.com/)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        return Ok(());
    }

    let target = Target::parse(&url)?;

    let mut request = Request::new(&target.host, &target.path);
    if let Some(v) = user_agent {
        request = request.user_agent(&v);
    }
    if let Some(v) = referer {
        request = request.referer(&v);
    }
    if let Some(v) = cookie {
        request = request.cookie(&v);
    }
    if let Some(v) = data {
        request = request.body(v);
    }

    let tls = TlsContext::new()?;
    log::info!("connecting to {}:{}", target.host, target.port);
    let transport = connect_to(
        &target.host,
        target.port,
        target.secure,
        &tls,
        &ConnectOptions::default(),
    )?;

    let mut session = Session::new(transport);
    session.send(&request)?;
    let response = session.receive()?;
    log::info!(
        "received {} bytes (status: {:?})",
        response.len(),
        response.status_code()
    );

    let mut stdout = std::io::stdout().lock();
    if head_only {
        stdout.write_all(response.status_line())?;
        stdout.write_all(b"\n")?;
        for (name, value) in response.header_lines() {
            stdout.write_all(name)?;
            stdout.write_all(b": ")?;
            stdout.write_all(value)?;
            stdout.write_all(b"\n")?;
        }
    } else {
        stdout.write_all(response.body())?;
    }
    stdout.flush()?;

    session.into_transport().disconnect();
    Ok(())
}

/// `scheme://host[:port][path]` を分解した結果
#[derive(Debug, PartialEq, Eq)]
struct Target {
    secure: bool,
    host: String,
    port: u16,
    path: String,
}

impl Target {
    fn parse(url: &str) -> Result<Self, String> {
        let (secure, rest) = if let Some(rest) = url.strip_prefix("https://") {
            (true, rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            (false, rest)
        } else {
            return Err("URL must start with http:// or https://".to_string());
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| format!("invalid port: {}", port))?;
                (host, port)
            }
            None => (authority, default_port(secure)),
        };
        if host.is_empty() {
            return Err("URL has no host".to_string());
        }

        Ok(Self {
            secure,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }
}
