#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod diagnostics;
mod display;
mod eth;
mod network;
mod time;

stm32_tim2_monotonic!(Mono, 1_000_000);

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1])]
mod app {
    use super::*;
    use defmt::{info, warn};
    use embassy_futures::join::join3;
    use embassy_net::Stack;
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::i2c::{self, I2c};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use ntp_clock_core::{ClockConfig, ClockService, DisplaySink, MonotonicClock, SyncError};

    use diagnostics::DefmtDiagnostics;
    use display::CharacterLcd;
    use network::{manager, NetworkConfig, SntpClient};
    use time::MonoClock;

    type Peri<T> = embassy_stm32::Peri<'static, T>;

    struct NetworkPeripherals {
        spi: Peri<peripherals::SPI2>,
        sck: Peri<peripherals::PB13>,
        mosi: Peri<peripherals::PB15>,
        miso: Peri<peripherals::PB14>,
        cs: Peri<peripherals::PC6>,
        reset: Peri<peripherals::PC3>,
        int: Peri<peripherals::PC2>,
        exti: Peri<peripherals::EXTI2>,
        dma_tx: Peri<peripherals::DMA1_CH4>,
        dma_rx: Peri<peripherals::DMA1_CH3>,
    }

    struct DisplayPeripherals {
        i2c: Peri<peripherals::I2C1>,
        scl: Peri<peripherals::PB6>,
        sda: Peri<peripherals::PB7>,
    }

    #[shared]
    struct Shared {}

    #[local]
    struct Local {}

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("NTP clock starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // HSE (12 MHz) / PREDIV(6) = 2 MHz (PLL input)
        // 2 MHz * MUL(168) = 336 MHz (VCO)
        // VCO / DIVP(4) = 84 MHz (SYSCLK)
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        let p = embassy_stm32::init(config);
        info!("PLL configured: SYSCLK=84MHz");

        // TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
        let timer_clock_hz = 84_000_000;
        Mono::start(timer_clock_hz);
        info!("TIM2 monotonic timer initialized at 1 MHz");

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC6,
            reset: p.PC3,
            int: p.PC2,
            exti: p.EXTI2,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };

        let display_periph = DisplayPeripherals {
            i2c: p.I2C1,
            scl: p.PB6,
            sda: p.PB7,
        };

        clock_task::spawn(net_periph, display_periph).ok();

        (Shared {}, Local {})
    }

    /// Clock task - owns the network stack, the LCD and the clock service
    ///
    /// Stack is !Send and must remain within this task. The W5500 runner, the
    /// embassy-net runner and the clock loop are joined so they share one
    /// cooperative context.
    #[task(priority = 1)]
    async fn clock_task(
        _cx: clock_task::Context,
        net: NetworkPeripherals,
        disp: DisplayPeripherals,
    ) -> ! {
        use embassy_net::{Config, StackResources};
        use static_cell::StaticCell;

        info!("Clock task started");
        let net_config = NetworkConfig::default();

        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(10_000_000); // 10 MHz for W5500

        let spi = Spi::new(
            net.spi,
            net.sck,
            net.mosi,
            net.miso,
            net.dma_tx,
            net.dma_rx,
            spi_config,
        );

        let eth_periph = eth::EthPeripherals {
            spi,
            cs: Output::new(net.cs, Level::High, Speed::VeryHigh),
            reset: Output::new(net.reset, Level::High, Speed::Low),
            int: ExtiInput::new(net.int, net.exti, Pull::Up),
        };
        let (device, w5500_runner) = eth::init_w5500(eth_periph, net_config.mac_addr).await;

        static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            net_config.seed,
        );
        info!("Network stack initialized with DHCP");

        let mut i2c_config = i2c::Config::default();
        i2c_config.frequency = Hertz(100_000);
        let i2c = I2c::new_blocking(disp.i2c, disp.scl, disp.sda, i2c_config);
        let mut lcd = CharacterLcd::new(i2c, display::DEFAULT_ADDRESS);
        if let Err(e) = lcd.init(&mut embassy_time::Delay).await {
            warn!("LCD init failed: {:?}", defmt::Debug2Format(&e));
        }

        let app_logic = async {
            manager::wait_for_config(&stack, &net_config).await;
            run_clock(stack, &mut lcd).await
        };

        let (never, _, _) = join3(w5500_runner.run(), net_runner.run(), app_logic).await;
        never
    }

    /// Control loop: advance, sync when due, render, sleep one refresh period
    async fn run_clock<S: DisplaySink>(stack: Stack<'static>, display: &mut S) -> ! {
        let config = ClockConfig::default();
        let mut clock = match ClockService::new(config, DefmtDiagnostics) {
            Ok(clock) => clock,
            Err(e) => defmt::panic!("Invalid clock configuration: {}", e),
        };
        let sntp = SntpClient::new();
        let mono = MonoClock;

        info!("Entering clock loop");
        loop {
            let now = mono.now_ticks();
            clock.advance(now);
            if clock.sync_due(now) {
                let result = sntp.fetch(stack).await.map_err(SyncError::from);
                clock.complete_sync(mono.now_ticks(), result);
            }

            if let Err(e) = clock.render_to(display) {
                warn!("Display layout failed: {}", e);
            }

            Mono::delay(config.refresh_interval_secs.secs()).await;
        }
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
