//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the rig configuration.
//!
//! - Validation: [`RigConfig::validate`] runs before every save; a stored
//!   blob that decodes but fails validation is reported as `ValidationFailed`
//!   so the caller can fall back to defaults.
//! - Encoding: postcard blob under one key.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!   The host backend is an in-memory map (dev/test only).

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::RigConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &core::ffi::CStr = c"wheeltest";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &core::ffi::CStr = c"rigcfg";

#[cfg(not(target_os = "espidf"))]
const CONFIG_KEY: &str = "wheeltest::rigcfg";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<&'static str, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Open the config namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, esp_err_t>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: namespace is a NUL-terminated literal; handle is an out-param.
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE.as_ptr(), mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is not used after this point.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: null buffer asks NVS for the stored size only.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr(), core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
            }
            let mut buf = vec![0u8; size];
            // SAFETY: buf has exactly `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // First boot: the namespace itself does not exist yet.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Ok(None),
            Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH as esp_err_t => Err(ConfigError::Corrupted),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.store.borrow().get(CONFIG_KEY).cloned())
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(bytes: &[u8]) -> Result<(), ConfigError> {
        let result = Self::with_nvs_handle(true, |handle| {
            // SAFETY: bytes outlives the call; NVS copies the blob.
            let ret = unsafe {
                nvs_set_blob(handle, CONFIG_KEY.as_ptr(), bytes.as_ptr().cast(), bytes.len())
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            // SAFETY: handle is open in read-write mode.
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.store.borrow_mut().insert(CONFIG_KEY, bytes.to_vec());
        Ok(())
    }

    /// Overwrite the stored blob without validation (host tests only).
    #[cfg(not(target_os = "espidf"))]
    pub fn put_raw(&self, bytes: &[u8]) {
        self.store.borrow_mut().insert(CONFIG_KEY, bytes.to_vec());
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<RigConfig, ConfigError> {
        #[cfg(target_os = "espidf")]
        let stored = Self::read_blob()?;
        #[cfg(not(target_os = "espidf"))]
        let stored = self.read_blob()?;

        let Some(bytes) = stored else {
            info!("NvsAdapter: no stored config, using defaults");
            return Ok(RigConfig::default());
        };
        let cfg: RigConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate().map_err(ConfigError::ValidationFailed)?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &RigConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(target_os = "espidf")]
        Self::write_blob(&bytes)?;
        #[cfg(not(target_os = "espidf"))]
        self.write_blob(&bytes)?;

        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
