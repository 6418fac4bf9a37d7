mod config;
mod error;
mod error_code;
mod ffmpeg;
mod file;
mod future;
mod init_metrics;
mod init_tracing;
mod middleware;
mod process;
mod process_map;
mod state;
mod store;
mod stream;

use actix_form_data::{Field, Form, FormData, Multipart, Value};
use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, App, HttpRequest, HttpResponse, HttpResponseBuilder, HttpServer,
};
use futures_core::Stream;
use futures_util::{StreamExt, TryStreamExt};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{path::Path, time::Duration};
use tracing::Instrument;
use tracing_actix_web::TracingLogger;

use self::{
    config::Operation,
    error::{Error, UploadError},
    future::WithMetrics,
    init_metrics::init_metrics,
    init_tracing::init_tracing,
    middleware::Metrics,
    process_map::ProcessMap,
    state::State,
    store::{FileKey, FileStore, FormatToken},
    stream::StreamTimeout,
};

pub use self::config::{ConfigSource, VidRsConfiguration};

const MEGABYTES: usize = 1024 * 1024;

#[derive(Debug)]
struct UploadedFile {
    key: FileKey,
    size: u64,
}

struct Upload(Value<UploadedFile>);

impl FormData for Upload {
    type Item = UploadedFile;
    type Error = Error;

    fn form(req: &HttpRequest) -> Form<Self::Item, Self::Error> {
        // Create a new Multipart Form validator
        //
        // This form is expecting a single file field, 'video'
        let state = req
            .app_data::<web::Data<State>>()
            .expect("No state in request")
            .clone();

        Form::new()
            .max_files(1)
            .max_file_size(state.config.media.max_file_size * MEGABYTES)
            .transform_error(transform_error)
            .field(
                "video",
                Field::file(move |filename, _, stream| {
                    let state = state.clone();

                    metrics::counter!(crate::init_metrics::FILES).increment(1);

                    let span = tracing::info_span!("file-upload", ?filename);

                    let stream = stream.map_err(std::io::Error::other);

                    Box::pin(
                        async move {
                            let key = FileKey::normalize(&filename)?;

                            let size = state.store.save_stream(&key, stream).await?;

                            Ok(UploadedFile { key, size })
                        }
                        .instrument(span),
                    )
                }),
            )
    }

    fn extract(value: Value<Self::Item>) -> Result<Self, Self::Error> {
        Ok(Upload(value))
    }
}

/// Handle responding to successful uploads
#[tracing::instrument(name = "Uploaded file", skip(value))]
async fn upload(Multipart(Upload(value)): Multipart<Upload>) -> Result<HttpResponse, Error> {
    let Some(file) = value
        .map()
        .and_then(|mut m| m.remove("video"))
        .and_then(|field| field.file())
    else {
        return Err(UploadError::NoFiles.into());
    };

    tracing::debug!("Uploaded {} as {}", file.filename, file.result.key);

    Ok(HttpResponse::Ok().json(&serde_json::json!({
        "message": "Video uploaded successfully",
        "filename": file.result.key.as_str(),
        "size": file.result.size,
    })))
}

#[derive(Debug, serde::Deserialize)]
struct ConvertRequest {
    filename: Option<String>,
    format: Option<String>,
}

/// Convert an uploaded video to a new container format
#[tracing::instrument(name = "Converting video", skip(state))]
async fn convert(
    web::Json(ConvertRequest { filename, format }): web::Json<ConvertRequest>,
    state: web::Data<State>,
) -> Result<HttpResponse, Error> {
    let (Some(filename), Some(format)) = (filename, format) else {
        return Err(UploadError::MissingConvertFields.into());
    };

    let key = FileKey::parse(&filename)?;
    let format = FormatToken::parse(&format)?;

    let Some(input) = state.store.incoming_file(&key).await? else {
        return Err(UploadError::MissingFile.into());
    };

    let output = key.converted(&format);
    let output_path = state.store.outgoing_path(&output);

    let _guard = state.process_map.claim(output_path.clone())?;

    ffmpeg::transcode(&input, &output_path, state.config.media.process_timeout)
        .with_metrics(crate::init_metrics::CONVERT_DURATION)
        .await
        .map_err(UploadError::Convert)?;

    Ok(HttpResponse::Ok().json(&serde_json::json!({
        "message": "Video converted successfully",
        "outputFilename": output.as_str(),
    })))
}

#[derive(Debug, serde::Deserialize)]
struct TrimRequest {
    filename: Option<String>,
    start: Option<f64>,
    duration: Option<f64>,
    format: Option<String>,
}

/// Trim an uploaded video down to a clip
#[tracing::instrument(name = "Trimming video", skip(state))]
async fn trim(
    web::Json(TrimRequest {
        filename,
        start,
        duration,
        format,
    }): web::Json<TrimRequest>,
    state: web::Data<State>,
) -> Result<HttpResponse, Error> {
    let (Some(filename), Some(start), Some(duration), Some(format)) =
        (filename, start, duration, format)
    else {
        return Err(UploadError::MissingTrimFields.into());
    };

    let key = FileKey::parse(&filename)?;
    let format = FormatToken::parse(&format)?;

    let Some(input) = state.store.incoming_file(&key).await? else {
        return Err(UploadError::MissingTrimInput.into());
    };

    let output = key.trimmed(&format);
    let output_path = state.store.outgoing_path(&output);

    let _guard = state.process_map.claim(output_path.clone())?;

    ffmpeg::trim(
        &input,
        &output_path,
        start,
        duration,
        state.config.media.process_timeout,
    )
    .with_metrics(crate::init_metrics::TRIM_DURATION)
    .await
    .map_err(UploadError::Trim)?;

    Ok(HttpResponse::Ok().json(&serde_json::json!({
        "message": "Video trimmed successfully",
        "outputFileName": output.as_str(),
    })))
}

/// Download a processed video
#[tracing::instrument(name = "Downloading video", skip(state))]
async fn download(
    filename: web::Path<String>,
    state: web::Data<State>,
) -> Result<HttpResponse, Error> {
    let key = FileKey::parse(&filename)?;

    let Some(path) = state.store.outgoing_file(&key).await? else {
        return Err(UploadError::MissingDownload.into());
    };

    let stream = state
        .store
        .to_stream(&path)
        .await
        .map_err(UploadError::Download)?;

    Ok(srv_response(HttpResponse::Ok(), stream, key.to_string()))
}

/// Fetch media properties for an uploaded video
#[tracing::instrument(name = "Fetching video metadata", skip(state))]
async fn info(
    filename: web::Path<String>,
    state: web::Data<State>,
) -> Result<HttpResponse, Error> {
    let key = FileKey::parse(&filename)?;

    let Some(input) = state.store.incoming_file(&key).await? else {
        return Err(UploadError::MissingFile.into());
    };

    let details = ffmpeg::probe(&input, state.config.media.process_timeout)
        .await
        .map_err(UploadError::Probe)?;

    Ok(HttpResponse::Ok().json(&serde_json::json!({
        "filename": key.as_str(),
        "duration": details.duration,
        "size": details.size,
        "format": details.format,
        "bitrate": details.bitrate,
        "video": details.video,
    })))
}

async fn healthz(state: web::Data<State>) -> Result<HttpResponse, Error> {
    state.store.health_check().await?;

    Ok(HttpResponse::Ok().json(&serde_json::json!({
        "msg": "ok",
    })))
}

fn srv_response<S, E>(mut builder: HttpResponseBuilder, stream: S, filename: String) -> HttpResponse
where
    S: Stream<Item = Result<web::Bytes, E>> + 'static,
    E: std::error::Error + 'static,
    actix_web::Error: From<E>,
{
    let stream = stream.timeout(Duration::from_secs(5)).map(|res| match res {
        Ok(Ok(item)) => Ok(item),
        Ok(Err(e)) => Err(actix_web::Error::from(e)),
        Err(e) => Err(Error::from(e).into()),
    });

    builder
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .content_type(mime::APPLICATION_OCTET_STREAM)
        .streaming(stream)
}

fn transform_error(error: actix_form_data::Error) -> actix_web::Error {
    let error: Error = error.into();
    let error: actix_web::Error = error.into();
    error
}

fn configure_endpoints(config: &mut web::ServiceConfig, state: State) {
    config
        .app_data(web::Data::new(state))
        .route("/healthz", web::get().to(healthz))
        .service(web::resource("/upload").route(web::post().to(upload)))
        .service(web::resource("/convert").route(web::post().to(convert)))
        .service(web::resource("/trim").route(web::post().to(trim)))
        .service(web::resource("/download/{filename}").route(web::get().to(download)))
        .service(web::resource("/info/{filename}").route(web::get().to(info)));
}

async fn launch(state: State) -> std::io::Result<()> {
    let address = state.config.server.address;

    HttpServer::new(move || {
        let state = state.clone();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Metrics)
            .configure(move |sc| configure_endpoints(sc, state))
    })
    .bind(address)?
    .run()
    .await
}

impl<P: AsRef<Path>, T: serde::Serialize> ConfigSource<P, T> {
    /// Initialize the vid-rs configuration
    ///
    /// This takes an optional config_file path which is a valid vid-rs configuration file, and an
    /// optional save_to path, which the generated configuration will be saved into. Since many
    /// parameters have defaults, it can be useful to dump a valid configuration with default values to
    /// see what is available for tweaking.
    ///
    /// When running vid-rs as a library, configuration is limited to environment variables and
    /// configuration files. Commandline options are not available.
    ///
    /// ```rust
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     vid_rs::ConfigSource::memory(serde_json::json!({
    ///         "server": {
    ///             "address": "127.0.0.1:3000"
    ///         },
    ///         "store": {
    ///             "type": "filesystem",
    ///             "path": "./data"
    ///         }
    ///     })).init::<&str>(None)?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn init<Q: AsRef<Path>>(
        self,
        save_to: Option<Q>,
    ) -> color_eyre::Result<VidRsConfiguration> {
        config::configure_without_clap(self, save_to)
    }
}

impl VidRsConfiguration {
    /// Build the vid-rs configuration from commandline arguments
    ///
    /// This is probably not useful for 3rd party applications that handle their own commandline
    pub fn build_default() -> color_eyre::Result<Self> {
        config::configure()
    }

    /// Install the default vid-rs tracer
    ///
    /// This is probably not useful for 3rd party applications that install their own tracing
    /// subscribers.
    pub fn install_tracing(self) -> color_eyre::Result<Self> {
        init_tracing(&self.config.tracing)?;
        Ok(self)
    }

    pub fn install_metrics(self) -> color_eyre::Result<Self> {
        if let Some(addr) = self.config.metrics.prometheus_address {
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()?;
        }

        Ok(self)
    }

    /// Run the vid-rs application
    pub async fn run(self) -> color_eyre::Result<()> {
        let VidRsConfiguration { config, operation } = self;

        let Operation::Run = operation;

        init_metrics();

        let config::Store::Filesystem(filesystem) = config.store.clone();

        let store = FileStore::build(&filesystem).await?;

        let state = State {
            config,
            store,
            process_map: ProcessMap::default(),
        };

        launch(state).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConvertRequest, TrimRequest};

    #[test]
    fn trim_request_accepts_zero_start() {
        let TrimRequest {
            filename,
            start,
            duration,
            format,
        } = serde_json::from_str(r#"{"filename":"a.mp4","start":0,"duration":2.5,"format":"webm"}"#)
            .expect("Valid json");

        assert_eq!(filename.as_deref(), Some("a.mp4"));
        assert_eq!(start, Some(0.0));
        assert_eq!(duration, Some(2.5));
        assert_eq!(format.as_deref(), Some("webm"));
    }

    #[test]
    fn trim_request_missing_fields_deserialize_to_none() {
        let TrimRequest {
            filename,
            start,
            duration,
            format,
        } = serde_json::from_str(r#"{"filename":"a.mp4"}"#).expect("Valid json");

        assert_eq!(filename.as_deref(), Some("a.mp4"));
        assert_eq!(start, None);
        assert_eq!(duration, None);
        assert_eq!(format, None);
    }

    #[test]
    fn convert_request_missing_fields_deserialize_to_none() {
        let ConvertRequest { filename, format } = serde_json::from_str("{}").expect("Valid json");

        assert_eq!(filename, None);
        assert_eq!(format, None);
    }
}
