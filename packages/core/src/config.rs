//! Централизованная конфигурация для Homoshare Core
//!
//! Все константы протокола определены здесь, чтобы отправитель и получатель
//! не расходились в размерах полей пакета.

use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // PAILLIER
    // ============================================

    /// Размер каждого из простых p и q (в битах)
    pub paillier_bits: usize,

    /// Выбирать g из малых простых {2, 3, 5, 7, 11}
    pub fast_generator: bool,

    /// Максимальное число попыток в `force_generate`
    pub max_keygen_attempts: u32,

    // ============================================
    // ПАКЕТЫ
    // ============================================

    /// Минимальное число каналов для `pack`
    pub min_partitions: usize,
}

impl Config {
    /// Создать конфигурацию с дефолтными значениями
    pub fn default() -> Self {
        Self {
            paillier_bits: 1024,
            fast_generator: true,
            max_keygen_attempts: 32,

            min_partitions: 2,
        }
    }

    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HOMOSHARE_PAILLIER_BITS") {
            if let Ok(parsed) = val.parse() {
                config.paillier_bits = parsed;
            }
        }

        if let Ok(val) = std::env::var("HOMOSHARE_MAX_KEYGEN_ATTEMPTS") {
            if let Ok(parsed) = val.parse() {
                config.max_keygen_attempts = parsed;
            }
        }

        if let Ok(val) = std::env::var("HOMOSHARE_FAST_GENERATOR") {
            if let Ok(parsed) = val.parse() {
                config.fast_generator = parsed;
            }
        }

        if let Ok(val) = std::env::var("HOMOSHARE_MIN_PARTITIONS") {
            if let Ok(parsed) = val.parse() {
                config.min_partitions = parsed;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.paillier_bits, 1024);
        assert!(config.fast_generator);
        assert_eq!(config.max_keygen_attempts, 32);
    }

    #[test]
    fn test_config_values() {
        let config = Config::default();

        // Packet layout
        assert_eq!(config.min_partitions, 2);

        // Unset variables keep the defaults
        std::env::remove_var("HOMOSHARE_MAX_KEYGEN_ATTEMPTS");
        assert_eq!(Config::from_env().max_keygen_attempts, config.max_keygen_attempts);
    }

    #[test]
    fn test_min_partitions_from_env() {
        std::env::set_var("HOMOSHARE_MIN_PARTITIONS", "4");
        assert_eq!(Config::from_env().min_partitions, 4);

        // Unparsable values keep the default
        std::env::set_var("HOMOSHARE_MIN_PARTITIONS", "four");
        assert_eq!(Config::from_env().min_partitions, 2);

        std::env::remove_var("HOMOSHARE_MIN_PARTITIONS");
    }
}
