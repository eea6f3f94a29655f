// Liquidsoap backend - turns a station's settings into a runnable script
// The engine itself runs elsewhere; we only write its config and playlist files

pub mod builder;  // ordered line buffer + script syntax helpers
pub mod callback; // curl commands for the internal API
pub mod encoder;  // per-mount encoder selection
pub mod engine;   // binary lookup + command line
pub mod sanitize; // literal escaping

pub use builder::ScriptBuilder;
pub use engine::engine_command;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{DeploymentContext, StationPaths};
use crate::error::{Error, Result};
use crate::station::{
    FrontendType, Playlist, PlaylistRepository, StationConfig, StationPorts, TrackListFormat,
};
use builder::{float_literal, list, Call};
use callback::{api_url_command, internal_endpoint, FormValue};
use sanitize::quote_text;

const NEXT_SONG_FN: &str = "next_song";
const DJ_AUTH_FN: &str = "dj_auth";
const LIVE_FLAG: &str = "live_enabled";
const BROADCAST_HOST: &str = "127.0.0.1";

pub const DEFAULT_PLAYLIST_NOTICE: &str = "No default playlist existed for the station, so one was \
     automatically created. You can add songs to it from the \"Media\" page.";

/// What a successful generation produced.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub path: PathBuf,
    pub contents: String,
    pub playlist_files: Vec<PathBuf>,
    /// Informational messages for whoever triggered the generation.
    pub notices: Vec<String>,
}

/// A playlist that made it into the script, and the variable it's bound to.
#[derive(Debug, Clone)]
struct MaterializedPlaylist {
    variable: String,
    weight: u32,
    is_default: bool,
}

pub struct ScriptGenerator {
    context: DeploymentContext,
}

impl ScriptGenerator {
    pub fn new(context: DeploymentContext) -> Self {
        Self { context }
    }

    /// Write the station's playlist files and script.
    ///
    /// Callers must not run two generations for the same station at once: the
    /// playlist directory is cleared and refilled without any locking. The only
    /// write besides files is the default playlist created through `repository`
    /// when the station has no enabled default playlist.
    pub fn generate(
        &self,
        station: &StationConfig,
        paths: &StationPaths,
        repository: &mut dyn PlaylistRepository,
    ) -> Result<GeneratedScript> {
        station.validate()?;
        let ports = station.ports()?;
        paths.ensure_exists()?;

        info!("Generating engine config for station {} ({})", station.id, station.name);

        let mut script = ScriptBuilder::new();
        let mut notices = Vec::new();

        self.write_preamble(&mut script, paths, &ports);
        self.write_callbacks(&mut script, station);
        write_live_toggle(&mut script);

        clear_playlist_dir(&paths.playlist_dir)?;

        script.comment("Fallback Playlists");
        let rotation = rotation_playlists(station, repository, &mut notices)?;
        let (materialized, playlist_files) = write_playlists(
            &mut script,
            &rotation,
            station.backend.playlist_format,
            &paths.playlist_dir,
        )?;
        script.blank();

        write_fallback(&mut script, &materialized);
        write_live_input(&mut script, ports.stream);
        write_switch(&mut script);
        write_crossfade(&mut script, station.backend.crossfade);
        write_custom_config(&mut script, station.backend.custom_config.as_deref());

        script.comment("Outbound Broadcast");
        self.write_outputs(&mut script, station)?;

        let contents = script.build();
        let path = paths.script_path();
        fs::write(&path, &contents).map_err(|e| Error::io(&path, e))?;
        info!("Wrote {} ({} playlist files)", path.display(), playlist_files.len());

        Ok(GeneratedScript {
            path,
            contents,
            playlist_files,
            notices,
        })
    }

    fn write_preamble(&self, script: &mut ScriptBuilder, paths: &StationPaths, ports: &StationPorts) {
        let pid_file = paths.config_dir.join("liquidsoap.pid");
        let log_file = paths.config_dir.join("liquidsoap.log");

        script
            .comment("WARNING! This file is automatically generated by harbormaster.")
            .comment("Do not update it directly!")
            .blank()
            .set("init.daemon", false)
            .set("init.daemon.pidfile.path", pid_file.display().to_string())
            .set("log.file.path", log_file.display().to_string());

        if self.context.log_stdout {
            script.set("log.stdout", true);
        }

        script
            .set("server.telnet", true)
            .set("server.telnet.bind_addr", self.context.telnet_bind_addr.as_str())
            .set("server.telnet.port", ports.telnet)
            .set("server.telnet.reverse_dns", false)
            .set("harbor.bind_addr", "0.0.0.0")
            .set("harbor.reverse_dns", false)
            .blank();
    }

    fn write_callbacks(&self, script: &mut ScriptBuilder, station: &StationConfig) {
        let next_song = api_url_command(
            &self.context,
            &internal_endpoint(station.id, "nextsong"),
            &station.api_key,
            &[],
        );
        script.comment("AutoDJ Next Song Script").function(
            NEXT_SONG_FN,
            &[],
            &[
                format!("uri = get_process_lines({})", next_song.to_expression()),
                "uri = list.hd(uri, default=\"\")".to_string(),
                "log(\"Next song response: #{uri}\")".to_string(),
                "request.create(uri)".to_string(),
            ],
        );
        script.blank();

        let auth = api_url_command(
            &self.context,
            &internal_endpoint(station.id, "auth"),
            &station.api_key,
            &[
                ("dj_user", FormValue::Runtime("user")),
                ("dj_password", FormValue::Runtime("password")),
            ],
        );
        script.comment("DJ Authentication").function(
            DJ_AUTH_FN,
            &["user", "password"],
            &[
                "log(\"Authenticating DJ: #{user}\")".to_string(),
                format!("ret = get_process_lines({})", auth.to_expression()),
                "ret = list.hd(ret, default=\"\")".to_string(),
                "log(\"DJ auth response: #{ret}\")".to_string(),
                "bool_of_string(ret)".to_string(),
            ],
        );
        script.blank();
    }

    fn write_outputs(&self, script: &mut ScriptBuilder, station: &StationConfig) -> Result<()> {
        let frontend = &station.frontend;
        if frontend.kind == FrontendType::Remote {
            error!(
                "Station {}: AutoDJ can't feed a remote frontend",
                station.id
            );
            return Err(Error::Configuration(
                "You cannot use an AutoDJ with a remote frontend. Please change the frontend \
                 type or update the backend to be \"Disabled\"."
                    .to_string(),
            ));
        }

        let url = station
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.context.public_base_url);

        // Indices count every mount so ids stay put when one is toggled off
        for (index, mount) in station.mounts.iter().enumerate() {
            let index = index + 1;
            if !mount.enable_autodj {
                debug!("Mount {} has AutoDJ disabled, skipping", mount.name);
                continue;
            }

            let encoder = encoder::encoder_for(mount.autodj_format, mount.bitrate(), frontend.kind);
            let params = match frontend.kind {
                FrontendType::Shoutcast2 => Call::new("")
                    .named("id", format!("radio_out_{}", index))
                    .named("host", BROADCAST_HOST)
                    .named("port", frontend.port)
                    .named("password", format!("{}:#{}", frontend.source_pw, index))
                    .named_raw("name", quote_text(&station.name))
                    .named_raw("url", quote_text(url))
                    .named("public", mount.is_public)
                    .named("protocol", "icy")
                    .named("encoding", "UTF-8"),
                _ => Call::new("")
                    .named("id", format!("radio_out_{}", index))
                    .named("host", BROADCAST_HOST)
                    .named("port", frontend.port)
                    .named("password", frontend.source_pw.as_str())
                    .named_raw("name", quote_text(&station.name))
                    .named_raw("description", quote_text(station.description.as_deref().unwrap_or("")))
                    .named_raw("url", quote_text(url))
                    .named_raw("mount", quote_text(&mount.name))
                    .named("public", mount.is_public)
                    .named("encoding", "UTF-8"),
            };

            script.output("output.icecast", &encoder, params, "radio");
        }

        Ok(())
    }
}

/// Enabled playlists, plus a freshly created default one if the rotation would be empty.
fn rotation_playlists(
    station: &StationConfig,
    repository: &mut dyn PlaylistRepository,
    notices: &mut Vec<String>,
) -> Result<Vec<Playlist>> {
    let mut playlists: Vec<Playlist> = station
        .playlists
        .iter()
        .filter(|p| p.is_enabled)
        .cloned()
        .collect();

    if !station.has_default_playlist() {
        info!("Station {}: {}", station.id, DEFAULT_PLAYLIST_NOTICE);
        let created = repository.create_default(station)?;
        playlists.push(created);
        notices.push(DEFAULT_PLAYLIST_NOTICE.to_string());
    }

    Ok(playlists)
}

/// Remove everything in the playlist directory. Individual failures are only logged.
fn clear_playlist_dir(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if let Err(e) = fs::remove_file(&path) {
            warn!("Couldn't remove stale playlist file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

fn write_playlists(
    script: &mut ScriptBuilder,
    playlists: &[Playlist],
    format: TrackListFormat,
    dir: &Path,
) -> Result<(Vec<MaterializedPlaylist>, Vec<PathBuf>)> {
    let mut taken = HashSet::new();
    let mut materialized = Vec::with_capacity(playlists.len());
    let mut files = Vec::with_capacity(playlists.len());

    for playlist in playlists {
        let short_name = unique_name(playlist.short_name(), &mut taken);
        let variable = format!("playlist_{}", short_name);
        let file = dir.join(format!("{}.{}", variable, format.extension()));

        fs::write(&file, playlist.export(format)).map_err(|e| Error::io(&file, e))?;
        debug!("Wrote {} tracks to {}", playlist.tracks.len(), file.display());

        let source = Call::new("playlist")
            .named("reload_mode", "watch")
            .arg(file.display().to_string());
        script.assign(&variable, source);

        materialized.push(MaterializedPlaylist {
            variable,
            weight: playlist.weight,
            is_default: playlist.is_default(),
        });
        files.push(file);
    }

    Ok((materialized, files))
}

/// `name`, or `name_2`, `name_3`... if something already claimed it.
fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", name, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn silence() -> Call {
    Call::new("blank").named("duration", 2.0)
}

fn write_fallback(script: &mut ScriptBuilder, playlists: &[MaterializedPlaylist]) {
    let defaults: Vec<&MaterializedPlaylist> = playlists.iter().filter(|p| p.is_default).collect();

    let random = Call::new("random")
        .named_raw("weights", list(defaults.iter().map(|p| p.weight)))
        .raw(list(defaults.iter().map(|p| p.variable.as_str())));
    script.assign("playlists", random);

    script.assign(
        "dynamic",
        Call::new("request.dynamic").named("id", NEXT_SONG_FN).raw(NEXT_SONG_FN),
    );
    script.assign(
        "dynamic",
        Call::new("cue_cut")
            .named("id", format!("{}_cued", NEXT_SONG_FN))
            .raw("dynamic"),
    );
    script.assign(
        "radio",
        Call::new("fallback")
            .named("track_sensitive", false)
            .raw(list(["dynamic".to_string(), "playlists".to_string(), silence().to_string()])),
    );
    script.blank();
}

fn write_live_toggle(script: &mut ScriptBuilder) {
    script
        .assign(LIVE_FLAG, "ref false")
        .blank()
        .function(
            "live_connected",
            &["header"],
            &["log(\"DJ Source connected!\")", "live_enabled := true"],
        )
        .blank()
        .function(
            "live_disconnected",
            &[],
            &["log(\"DJ Source disconnected!\")", "live_enabled := false"],
        )
        .blank();
}

fn write_live_input(script: &mut ScriptBuilder, stream_port: u16) {
    let harbor = Call::new("input.harbor")
        .arg("/")
        .named("port", stream_port)
        .named("user", "shoutcast")
        .named_raw("auth", DJ_AUTH_FN)
        .named("icy", true)
        .named("max", 30.0)
        .named("buffer", 5.0)
        .named("icy_metadata_charset", "UTF-8")
        .named("metadata_charset", "UTF-8")
        .named_raw("on_connect", "live_connected")
        .named_raw("on_disconnect", "live_disconnected");

    script
        .assign("live", Call::new("audio_to_stereo").raw(harbor))
        .line(
            Call::new("ignore")
                .raw(Call::new("output.dummy").raw("live").named("fallible", true))
                .to_string(),
        )
        .assign(
            "live",
            Call::new("fallback")
                .named("track_sensitive", false)
                .raw(list(["live".to_string(), silence().to_string()])),
        )
        .blank();
}

fn write_switch(script: &mut ScriptBuilder) {
    let cases = list([format!("({{!{}}}, live)", LIVE_FLAG), "({true}, radio)".to_string()]);
    script
        .assign(
            "radio",
            Call::new("switch")
                .named("id", "live_switch")
                .named("track_sensitive", false)
                .raw(cases),
        )
        .blank();
}

/// Start the next track at 1.5x the fade length, rounded.
pub fn crossfade_start_next(crossfade: u32) -> u32 {
    (crossfade as f64 * 1.5).round() as u32
}

fn write_crossfade(script: &mut ScriptBuilder, crossfade: u32) {
    if crossfade == 0 {
        return;
    }

    let fade = crossfade as f64;
    script
        .comment("Crossfading")
        .assign(
            "radio",
            Call::new("crossfade")
                .named_raw("start_next", float_literal(crossfade_start_next(crossfade) as f64))
                .named_raw("fade_out", float_literal(fade))
                .named_raw("fade_in", float_literal(fade))
                .raw("radio"),
        )
        .blank();
}

fn write_custom_config(script: &mut ScriptBuilder, custom: Option<&str>) {
    let Some(custom) = custom.filter(|c| !c.trim().is_empty()) else {
        return;
    };

    script
        .comment("Custom Configuration (Specified in Station Profile)")
        .verbatim(custom)
        .blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::tests::sample_station;
    use crate::station::{AutodjFormat, Mount, PlaylistKind, PlaylistTrack};
    use tempfile::TempDir;

    /// Records what the generator asked it to create.
    #[derive(Default)]
    struct MemoryRepository {
        created: Vec<Playlist>,
    }

    impl PlaylistRepository for MemoryRepository {
        fn create_default(&mut self, _station: &StationConfig) -> Result<Playlist> {
            let playlist = Playlist::empty_default();
            self.created.push(playlist.clone());
            Ok(playlist)
        }
    }

    fn scratch() -> (TempDir, StationPaths) {
        let dir = TempDir::new().unwrap();
        let paths = StationPaths::new(dir.path().join("playlists"), dir.path().join("config"));
        (dir, paths)
    }

    fn generate(station: &StationConfig, paths: &StationPaths) -> Result<GeneratedScript> {
        ScriptGenerator::new(DeploymentContext::host()).generate(
            station,
            paths,
            &mut MemoryRepository::default(),
        )
    }

    fn line_with<'a>(script: &'a str, needle: &str) -> &'a str {
        script
            .lines()
            .find(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {:?} in:\n{}", needle, script))
    }

    fn output_lines(script: &str) -> Vec<&str> {
        script.lines().filter(|l| l.starts_with("output.icecast(")).collect()
    }

    #[test]
    fn test_script_is_written_to_config_dir() {
        let (_dir, paths) = scratch();
        let generated = generate(&sample_station(), &paths).unwrap();

        assert_eq!(generated.path, paths.config_dir.join("liquidsoap.liq"));
        assert_eq!(fs::read_to_string(&generated.path).unwrap(), generated.contents);
        assert!(generated.notices.is_empty());
    }

    #[test]
    fn test_preamble_uses_derived_ports() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.id = 3;
        let script = generate(&station, &paths).unwrap().contents;

        assert!(script.starts_with("# WARNING! This file is automatically generated"));
        assert!(script.contains("set(\"server.telnet.port\", 8024)"));
        assert!(script.contains("set(\"server.telnet.bind_addr\", \"127.0.0.1\")"));
        assert!(!script.contains("log.stdout"));
        assert!(line_with(&script, "input.harbor(").contains("port=8025"));
    }

    #[test]
    fn test_docker_context_changes_bindings() {
        let (_dir, paths) = scratch();
        let script = ScriptGenerator::new(DeploymentContext::docker())
            .generate(&sample_station(), &paths, &mut MemoryRepository::default())
            .unwrap()
            .contents;

        assert!(script.contains("set(\"log.stdout\", true)"));
        assert!(script.contains("set(\"server.telnet.bind_addr\", \"0.0.0.0\")"));
        assert!(script.contains("http://nginx/api/internal/1/nextsong"));
    }

    #[test]
    fn test_callbacks_embed_api_key() {
        let (_dir, paths) = scratch();
        let script = generate(&sample_station(), &paths).unwrap().contents;

        let next = line_with(&script, "/api/internal/1/nextsong");
        assert!(next.contains("--form-string api_auth=abc123\")"));

        let auth = line_with(&script, "/api/internal/1/auth");
        assert!(auth.contains("--form-string dj_user=\" ^ string.quote(user) ^ \""));
        assert!(auth.contains("--form-string dj_password=\" ^ string.quote(password) ^ \""));
        assert!(!auth.contains("--form "));
        assert!(!auth.contains("#{"));
        assert!(script.contains("def dj_auth(user,password) ="));
    }

    #[test]
    fn test_missing_default_playlist_is_created_once() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.playlists = vec![Playlist {
            kind: PlaylistKind::Scheduled,
            ..Playlist::new("Show")
        }];

        let mut repo = MemoryRepository::default();
        let generated = ScriptGenerator::new(DeploymentContext::host())
            .generate(&station, &paths, &mut repo)
            .unwrap();

        assert_eq!(repo.created.len(), 1);
        assert_eq!(generated.notices, vec![DEFAULT_PLAYLIST_NOTICE.to_string()]);
        assert!(paths.playlist_dir.join("playlist_default.m3u").exists());
        assert!(generated
            .contents
            .contains("playlists = random(weights=[3], [playlist_default])"));
        // the scheduled playlist is materialized but stays out of the rotation
        assert!(generated.contents.contains("playlist_show = playlist("));
    }

    #[test]
    fn test_existing_default_playlist_means_no_write() {
        let (_dir, paths) = scratch();
        let mut repo = MemoryRepository::default();
        ScriptGenerator::new(DeploymentContext::host())
            .generate(&sample_station(), &paths, &mut repo)
            .unwrap();
        assert!(repo.created.is_empty());
    }

    #[test]
    fn test_weighted_rotation_and_disabled_playlists() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.playlists = vec![
            Playlist { weight: 5, ..Playlist::new("Rock") },
            Playlist { is_enabled: false, ..Playlist::new("Off") },
            Playlist { weight: 1, ..Playlist::new("Jazz") },
        ];

        let generated = generate(&station, &paths).unwrap();
        let script = &generated.contents;

        assert!(script.contains("playlists = random(weights=[5, 1], [playlist_rock, playlist_jazz])"));
        assert!(!script.contains("playlist_off"));
        assert_eq!(generated.playlist_files.len(), 2);

        let rock = paths.playlist_dir.join("playlist_rock.m3u");
        assert!(script.contains(&format!(
            "playlist_rock = playlist(reload_mode=\"watch\", \"{}\")",
            rock.display()
        )));
    }

    #[test]
    fn test_fallback_chain_order() {
        let (_dir, paths) = scratch();
        let script = generate(&sample_station(), &paths).unwrap().contents;

        assert!(script.contains("dynamic = request.dynamic(id=\"next_song\", next_song)"));
        assert!(script.contains("dynamic = cue_cut(id=\"next_song_cued\", dynamic)"));
        assert!(script.contains(
            "radio = fallback(track_sensitive=false, [dynamic, playlists, blank(duration=2.)])"
        ));
        assert!(script.contains(
            "radio = switch(id=\"live_switch\", track_sensitive=false, [({!live_enabled}, live), ({true}, radio)])"
        ));

        // definitions come before use
        let def = script.find("def next_song()").unwrap();
        let used = script.find("request.dynamic(").unwrap();
        let switch = script.find("radio = switch(").unwrap();
        let output = script.find("output.icecast(").unwrap();
        assert!(def < used && used < switch && switch < output);
    }

    #[test]
    fn test_playlist_files_hold_exported_tracks() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.playlists[0].tracks.push(PlaylistTrack::new("/music/one.mp3"));

        generate(&station, &paths).unwrap();
        let written = fs::read_to_string(paths.playlist_dir.join("playlist_main_rotation.m3u")).unwrap();
        assert!(written.starts_with("#EXTM3U\n"));
        assert!(written.contains("/music/one.mp3"));
    }

    #[test]
    fn test_pls_format_changes_file_extension() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.backend.playlist_format = TrackListFormat::Pls;

        let generated = generate(&station, &paths).unwrap();
        assert_eq!(
            generated.playlist_files,
            vec![paths.playlist_dir.join("playlist_main_rotation.pls")]
        );
    }

    #[test]
    fn test_regeneration_leaves_no_stale_files() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.playlists = vec![Playlist::new("A"), Playlist::new("B")];
        generate(&station, &paths).unwrap();
        fs::write(paths.playlist_dir.join("leftover.txt"), "junk").unwrap();

        station.playlists = vec![Playlist::new("C")];
        generate(&station, &paths).unwrap();

        let mut remaining: Vec<String> = fs::read_dir(&paths.playlist_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["playlist_c.m3u".to_string()]);
    }

    #[test]
    fn test_undeletable_entries_are_tolerated() {
        let (_dir, paths) = scratch();
        fs::create_dir_all(paths.playlist_dir.join("a_directory")).unwrap();

        let generated = generate(&sample_station(), &paths);
        assert!(generated.is_ok());
        assert!(paths.playlist_dir.join("a_directory").exists());
    }

    #[test]
    fn test_duplicate_short_names_get_suffixes() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.playlists = vec![Playlist::new("Hits!"), Playlist::new("hits")];

        let script = generate(&station, &paths).unwrap().contents;
        assert!(script.contains("[playlist_hits, playlist_hits_2]"));
    }

    #[test]
    fn test_crossfade_start_next() {
        assert_eq!(crossfade_start_next(4), 6);
        assert_eq!(crossfade_start_next(2), 3);
        assert_eq!(crossfade_start_next(3), 5); // 4.5 rounds away from zero
        assert_eq!(crossfade_start_next(1), 2);
    }

    #[test]
    fn test_crossfade_block() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.backend.crossfade = 4;
        let script = generate(&station, &paths).unwrap().contents;
        assert!(script.contains("radio = crossfade(start_next=6., fade_out=4., fade_in=4., radio)"));

        station.backend.crossfade = 0;
        let script = generate(&station, &paths).unwrap().contents;
        assert!(!script.contains("crossfade("));
        assert!(!script.contains("# Crossfading"));
    }

    #[test]
    fn test_custom_config_is_verbatim() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.backend.custom_config = Some("radio = amplify(1.2, radio)\n# \"raw\"".to_string());

        let script = generate(&station, &paths).unwrap().contents;
        assert!(script.contains(
            "# Custom Configuration (Specified in Station Profile)\nradio = amplify(1.2, radio)\n# \"raw\""
        ));
        // custom config lands after crossfade and before the outputs
        assert!(script.find("amplify").unwrap() > script.find("crossfade(").unwrap());
        assert!(script.find("amplify").unwrap() < script.find("# Outbound Broadcast").unwrap());

        station.backend.custom_config = Some("   ".to_string());
        let script = generate(&station, &paths).unwrap().contents;
        assert!(!script.contains("Custom Configuration"));
    }

    #[test]
    fn test_remote_frontend_is_a_configuration_error() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.frontend.kind = FrontendType::Remote;

        let err = generate(&station, &paths).unwrap_err();
        assert!(err.is_configuration());
        assert!(!paths.script_path().exists());
    }

    #[test]
    fn test_icecast_outputs_per_mount() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.mounts = vec![
            Mount { is_public: true, ..Mount::new("/radio.mp3", AutodjFormat::Mp3, 192) },
            Mount::new("/radio.ogg", AutodjFormat::Ogg, 96),
        ];

        let script = generate(&station, &paths).unwrap().contents;
        let outputs = output_lines(&script);
        assert_eq!(outputs.len(), 2);

        assert!(outputs[0].contains("%mp3.cbr(samplerate=44100, stereo=true, bitrate=192)"));
        assert!(outputs[0].contains("id=\"radio_out_1\""));
        assert!(outputs[0].contains("mount=\"/radio.mp3\""));
        assert!(outputs[0].contains("public=true"));
        assert!(outputs[0].contains("password=\"hackme\""));
        assert!(outputs[0].contains("description=\"Just testing\""));
        assert!(outputs[0].ends_with(", radio)"));

        assert!(outputs[1].contains("%vorbis.cbr(samplerate=44100, channels=2, bitrate=96)"));
        assert!(outputs[1].contains("id=\"radio_out_2\""));
        assert!(outputs[1].contains("mount=\"/radio.ogg\""));
        assert!(outputs[1].contains("public=false"));
    }

    #[test]
    fn test_disabled_mounts_keep_their_index() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.mounts = vec![
            Mount { enable_autodj: false, ..Mount::new("/off", AutodjFormat::Mp3, 128) },
            Mount::new("/on", AutodjFormat::Aac, 64),
        ];

        let script = generate(&station, &paths).unwrap().contents;
        let outputs = output_lines(&script);
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].contains("id=\"radio_out_2\""));
        assert!(outputs[0].contains("%fdkaac("));
    }

    #[test]
    fn test_shoutcast_outputs_share_port_with_indexed_passwords() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.frontend.kind = FrontendType::Shoutcast2;
        station.mounts = vec![
            Mount::new("/a", AutodjFormat::Mp3, 128),
            Mount::new("/b", AutodjFormat::Aac, 64),
        ];

        let script = generate(&station, &paths).unwrap().contents;
        let outputs = output_lines(&script);
        assert_eq!(outputs.len(), 2);

        for (i, output) in outputs.iter().enumerate() {
            assert!(output.contains("port=8000"));
            assert!(output.contains(&format!("password=\"hackme:#{}\"", i + 1)));
            assert!(output.contains("protocol=\"icy\""));
            assert!(!output.contains("mount="));
            assert!(!output.contains("description="));
        }
        assert!(outputs[1].contains("%fdkaac("));
    }

    #[test]
    fn test_free_text_is_sanitized() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.name = "Rock \"n\" Roll\nRadio".to_string();
        station.description = Some("Line one\r\nLine \"two\"".to_string());

        let script = generate(&station, &paths).unwrap().contents;
        let output = output_lines(&script)[0];
        assert!(output.contains("name=\"Rock 'n' RollRadio\""));
        assert!(output.contains("description=\"Line oneLine 'two'\""));
    }

    #[test]
    fn test_interpolation_markers_in_user_text_stay_literal() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.name = "DJ #{name}".to_string();
        station.frontend.source_pw = "pw#{x}".to_string();
        station.mounts[0].name = "/#{m}.mp3".to_string();

        let script = generate(&station, &paths).unwrap().contents;
        let output = output_lines(&script)[0];
        assert!(!output.contains("#{"));
        assert!(output.contains("name=\"DJ #\" ^ \"{name}\""));
        assert!(output.contains("password=\"pw#\" ^ \"{x}\""));
        assert!(output.contains("mount=\"/#\" ^ \"{m}.mp3\""));
    }

    #[test]
    fn test_missing_url_falls_back_to_base_url() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.url = None;

        let mut context = DeploymentContext::host();
        context.public_base_url = "radio.example.org".to_string();
        let script = ScriptGenerator::new(context)
            .generate(&station, &paths, &mut MemoryRepository::default())
            .unwrap()
            .contents;

        assert!(output_lines(&script)[0].contains("url=\"radio.example.org\""));
    }

    #[test]
    fn test_invalid_station_writes_nothing() {
        let (_dir, paths) = scratch();
        let mut station = sample_station();
        station.id = 0;

        assert!(generate(&station, &paths).is_err());
        assert!(!paths.playlist_dir.exists());
    }
}
