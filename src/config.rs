// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded once at startup. Nothing else in the crate reads the
//! environment directly.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Auth0 tenant domain (e.g. `tenant.auth0.com`) | Required |
//! | `AUTH0_API_AUDIENCE` | Expected `aud` claim of Auth0 tokens | Required |
//! | `DEMO_JWT_SECRET` | HS256 secret for demo tokens (min 32 chars) | Required |
//! | `DATABASE_PATH` | redb database file | `data/questionaura.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `CORS_ORIGINS` | Comma-separated allowed origins | `http://localhost:5173` |
//! | `ENVIRONMENT` | `development`, `staging` or `production` | `development` |
//! | `CLOUDINARY_CLOUD_NAME` | Cloudinary cloud name | Optional |
//! | `CLOUDINARY_API_KEY` | Cloudinary API key | Optional |
//! | `CLOUDINARY_API_SECRET` | Cloudinary API secret | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const AUTH0_API_AUDIENCE_ENV: &str = "AUTH0_API_AUDIENCE";
pub const DEMO_JWT_SECRET_ENV: &str = "DEMO_JWT_SECRET";

/// Environment variable name for the redb database file.
///
/// # Default
/// `data/questionaura.redb` relative to the working directory.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const CORS_ORIGINS_ENV: &str = "CORS_ORIGINS";
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";
pub const CLOUDINARY_CLOUD_NAME_ENV: &str = "CLOUDINARY_CLOUD_NAME";
pub const CLOUDINARY_API_KEY_ENV: &str = "CLOUDINARY_API_KEY";
pub const CLOUDINARY_API_SECRET_ENV: &str = "CLOUDINARY_API_SECRET";

const DEFAULT_DATABASE_PATH: &str = "data/questionaura.redb";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

/// Minimum length of the demo token signing secret.
pub const MIN_DEMO_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Invalid {
                var: ENVIRONMENT_ENV,
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }
}

/// Settings for the two token verification paths.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Expected `iss` claim of external tokens (`https://{domain}/`).
    pub issuer: String,
    /// Expected `aud` claim of external tokens. Also stamped on demo tokens.
    pub audience: String,
    /// JWKS endpoint of the identity provider.
    pub jwks_url: String,
    /// HS256 secret for demo tokens.
    pub demo_secret: String,
}

impl AuthSettings {
    /// Derive issuer and JWKS URL from an Auth0 domain.
    pub fn from_domain(
        domain: &str,
        audience: impl Into<String>,
        demo_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let domain = domain
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/');
        if domain.is_empty() {
            return Err(ConfigError::Missing(AUTH0_DOMAIN_ENV));
        }

        let issuer = format!("https://{domain}/");
        let jwks_url = url::Url::parse(&issuer)
            .and_then(|base| base.join(".well-known/jwks.json"))
            .map_err(|e| ConfigError::Invalid {
                var: AUTH0_DOMAIN_ENV,
                reason: e.to_string(),
            })?
            .to_string();

        let demo_secret = demo_secret.into();
        if demo_secret.len() < MIN_DEMO_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: DEMO_JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_DEMO_SECRET_LEN} characters long"),
            });
        }

        Ok(Self {
            issuer,
            audience: audience.into(),
            jwks_url,
            demo_secret,
        })
    }
}

/// Cloudinary credentials. Present only when all three variables are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub cors_origins: Vec<String>,
    pub auth: AuthSettings,
    pub cloudinary: Option<CloudinarySettings>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let environment = match lookup(ENVIRONMENT_ENV) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(value) => value.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    var: HOST_ENV,
                    reason: format!("'{host}' is not a valid bind address"),
                })?;

        let database_path = lookup(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let cors_origins = parse_origins(
            &lookup(CORS_ORIGINS_ENV).unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let auth = AuthSettings::from_domain(
            &required(AUTH0_DOMAIN_ENV)?,
            required(AUTH0_API_AUDIENCE_ENV)?,
            required(DEMO_JWT_SECRET_ENV)?,
        )?;

        let cloudinary = match (
            lookup(CLOUDINARY_CLOUD_NAME_ENV),
            lookup(CLOUDINARY_API_KEY_ENV),
            lookup(CLOUDINARY_API_SECRET_ENV),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret))
                if !cloud_name.is_empty() && !api_key.is_empty() && !api_secret.is_empty() =>
            {
                Some(CloudinarySettings {
                    cloud_name,
                    api_key,
                    api_secret,
                })
            }
            _ => None,
        };

        Ok(Self {
            environment,
            bind_addr,
            database_path,
            cors_origins,
            auth,
            cloudinary,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
